//! # Naming
//!
//! Path splitting, resource key derivation and the declaration names used for
//! resources, models, methods and integrations.

use crate::error::{ProvisioningError, ProvisioningResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Split a path template into its non-empty segments.
///
/// Leading, trailing and doubled slashes produce no segments. A path without any
/// segment is a malformed route.
pub fn split_path(path: &str) -> ProvisioningResult<Vec<String>> {
    let segments: Vec<String> = path
        .split('/')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        return Err(ProvisioningError::malformed_route(
            path,
            "path must contain at least one non-empty segment",
        ));
    }

    Ok(segments)
}

/// Identity of a declared hierarchy node: every segment from the root up to and
/// including this one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the segments of a prefix are combined into a [`ResourceKey`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKeyStrategy {
    /// Segments joined without a separator. `ab/c` and `a/bc` share a key.
    #[default]
    Concatenated,
    /// Segments joined with `/`, which never occurs inside a segment
    Delimited,
}

impl ResourceKeyStrategy {
    /// Key for the node at the end of `prefix`
    pub fn key_for<S: AsRef<str>>(self, prefix: &[S]) -> ResourceKey {
        let separator = match self {
            ResourceKeyStrategy::Concatenated => "",
            ResourceKeyStrategy::Delimited => "/",
        };
        let key = prefix
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(separator);
        ResourceKey(key)
    }
}

impl FromStr for ResourceKeyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concatenated" => Ok(ResourceKeyStrategy::Concatenated),
            "delimited" => Ok(ResourceKeyStrategy::Delimited),
            other => Err(format!(
                "unknown resource key strategy '{other}' (expected 'concatenated' or 'delimited')"
            )),
        }
    }
}

impl fmt::Display for ResourceKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKeyStrategy::Concatenated => f.write_str("concatenated"),
            ResourceKeyStrategy::Delimited => f.write_str("delimited"),
        }
    }
}

/// Keep only ASCII letters and digits. Input that is already alphanumeric is
/// returned unchanged.
pub fn sanitize_alphanumeric(input: &str) -> String {
    if input.chars().all(|c| c.is_ascii_alphanumeric()) {
        return input.to_string();
    }
    input.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Model name for a route: terminal segment followed by the HTTP method, reduced to
/// ASCII letters and digits.
pub fn derive_model_name(terminal_segment: &str, http_method: &str) -> ProvisioningResult<String> {
    let raw = format!("{terminal_segment}{http_method}");
    let sanitized = sanitize_alphanumeric(&raw);
    if sanitized.is_empty() {
        return Err(ProvisioningError::EmptyModelName(raw));
    }
    Ok(sanitized)
}

/// Name for a child resource whose literal segment was already used under another parent
pub fn disambiguated_resource_name(segment: &str, parent_id: &str) -> String {
    format!("{segment}{parent_id}")
}

/// Declaration name of a method: path template followed by the HTTP method
pub fn method_declaration_name(path: &str, http_method: &str) -> String {
    format!("{path}{http_method}")
}

/// Declaration name of an integration: HTTP method followed by the path template
pub fn integration_declaration_name(http_method: &str, path: &str) -> String {
    format!("{http_method}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_drops_empty_tokens() {
        assert_eq!(
            split_path("//v1/defaultValues/").unwrap(),
            vec!["v1".to_string(), "defaultValues".to_string()]
        );
    }

    #[test]
    fn test_split_path_rejects_root_only() {
        for path in ["", "/", "///"] {
            let err = split_path(path).unwrap_err();
            assert_eq!(err.as_str(), "malformed_route", "path {path:?}");
        }
    }

    #[test]
    fn test_concatenated_keys_collide_on_shifted_boundaries() {
        let strategy = ResourceKeyStrategy::Concatenated;
        assert_eq!(strategy.key_for(&["ab", "c"]), strategy.key_for(&["a", "bc"]));
        assert_eq!(strategy.key_for(&["v1", "healthcheck"]).as_str(), "v1healthcheck");
    }

    #[test]
    fn test_delimited_keys_keep_boundaries() {
        let strategy = ResourceKeyStrategy::Delimited;
        assert_ne!(strategy.key_for(&["ab", "c"]), strategy.key_for(&["a", "bc"]));
        assert_eq!(strategy.key_for(&["v1", "healthcheck"]).as_str(), "v1/healthcheck");
    }

    #[test]
    fn test_key_strategy_from_str() {
        assert_eq!(
            "Delimited".parse::<ResourceKeyStrategy>().unwrap(),
            ResourceKeyStrategy::Delimited
        );
        assert!("slashes".parse::<ResourceKeyStrategy>().is_err());
    }

    #[test]
    fn test_derive_model_name_strips_symbols() {
        assert_eq!(
            derive_model_name("priceEvaluation:bulkEvaluate", "POST").unwrap(),
            "priceEvaluationbulkEvaluatePOST"
        );
        assert_eq!(derive_model_name("{sku}", "GET").unwrap(), "skuGET");
    }

    #[test]
    fn test_derive_model_name_is_idempotent() {
        let once = derive_model_name("required-Inputs_V2", "POST").unwrap();
        let twice = derive_model_name(&once, "").unwrap();
        assert_eq!(once, "requiredInputsV2POST");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_derive_model_name_rejects_empty_result() {
        let err = derive_model_name("{-}", "").unwrap_err();
        assert!(matches!(err, ProvisioningError::EmptyModelName(_)));
    }

    #[test]
    fn test_declaration_names() {
        assert_eq!(
            method_declaration_name("/v1/healthcheck", "GET"),
            "/v1/healthcheckGET"
        );
        assert_eq!(
            integration_declaration_name("GET", "/v1/healthcheck"),
            "GET/v1/healthcheck"
        );
        assert_eq!(disambiguated_resource_name("{sku}", "res-4"), "{sku}res-4");
    }
}
