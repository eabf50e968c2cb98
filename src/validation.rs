//! # Validation
//!
//! Validates a [`CreateApiGatewayRequest`] before anything is declared.

use crate::constants::SUPPORTED_HTTP_METHODS;
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::gateway::naming::split_path;
use crate::request::{CreateApiGatewayRequest, RouteSpec};
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

fn compile(pattern: &str) -> ProvisioningResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        ProvisioningError::InvalidRequest(format!("Failed to compile regex '{pattern}': {e}"))
    })
}

/// Validate every request-level field and every route
pub fn validate_request(request: &CreateApiGatewayRequest) -> ProvisioningResult<()> {
    validate_stack_name(&request.stack_name)?;

    if request.api_name.trim().is_empty() {
        return Err(ProvisioningError::InvalidRequest(
            "ApiName cannot be empty".to_string(),
        ));
    }
    validate_backend_url(&request.url)?;

    if request.deployment_name.trim().is_empty() {
        return Err(ProvisioningError::InvalidRequest(
            "deploymentName cannot be empty".to_string(),
        ));
    }
    validate_stage_name(&request.stage_name)?;

    if let Some(domain) = request.custom_domain() {
        validate_domain_name(domain)?;
    }

    if request.routes.is_empty() {
        return Err(ProvisioningError::InvalidRequest(
            "at least one route is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for route in &request.routes {
        validate_route(route)?;
        if !seen.insert((route.path.as_str(), route.http_method.as_str())) {
            return Err(ProvisioningError::malformed_route(
                &route.path,
                format!("{} is declared more than once", route.http_method),
            ));
        }
    }

    Ok(())
}

/// Stack names: letters, digits, `.`, `_`, `-` and `/` (organisation-qualified names)
pub fn validate_stack_name(stack_name: &str) -> ProvisioningResult<()> {
    if stack_name.trim().is_empty() {
        return Err(ProvisioningError::MissingStackName);
    }

    let stack_regex = compile(r"^[A-Za-z0-9][A-Za-z0-9._/-]*$")?;
    if !stack_regex.is_match(stack_name) {
        return Err(ProvisioningError::InvalidRequest(format!(
            "Invalid stack name '{stack_name}'. Must start with a letter or digit and contain only letters, digits, '.', '_', '-' or '/'"
        )));
    }
    Ok(())
}

/// Backend base URL prepended to every route path
pub fn validate_backend_url(url: &str) -> ProvisioningResult<()> {
    let url_regex = compile(r"^https?://[^\s/]+(/\S*)?$")?;
    if !url_regex.is_match(url) {
        return Err(ProvisioningError::InvalidRequest(format!(
            "Invalid backend url '{url}'. Expected http:// or https:// followed by a host"
        )));
    }
    if url.ends_with('/') {
        warn!(
            "Backend url '{}' ends with '/', integration URIs will contain '//'",
            url
        );
    }
    Ok(())
}

/// API Gateway stage names: letters, digits, `_` and `-`
pub fn validate_stage_name(stage_name: &str) -> ProvisioningResult<()> {
    let stage_regex = compile(r"^[A-Za-z0-9_-]{1,128}$")?;
    if !stage_regex.is_match(stage_name) {
        return Err(ProvisioningError::InvalidRequest(format!(
            "Invalid stageName '{stage_name}'. Must be 1-128 letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

pub fn validate_domain_name(domain: &str) -> ProvisioningResult<()> {
    let domain_regex = compile(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$",
    )?;
    if !domain_regex.is_match(domain) {
        return Err(ProvisioningError::InvalidRequest(format!(
            "Invalid domainName '{domain}'"
        )));
    }
    Ok(())
}

/// Validate one route: method, segments, placeholders and path parameters
pub fn validate_route(route: &RouteSpec) -> ProvisioningResult<()> {
    if !SUPPORTED_HTTP_METHODS.contains(&route.http_method.as_str()) {
        return Err(ProvisioningError::malformed_route(
            &route.path,
            format!(
                "unsupported httpMethod '{}'. Expected one of: {}",
                route.http_method,
                SUPPORTED_HTTP_METHODS.join(", ")
            ),
        ));
    }

    let segments = split_path(&route.path)?;

    // {name} or greedy {name+}
    let placeholder_regex = compile(r"^\{[A-Za-z0-9_.-]+\+?\}$")?;
    for segment in &segments {
        let has_brace = segment.contains('{') || segment.contains('}');
        if has_brace && !placeholder_regex.is_match(segment) {
            return Err(ProvisioningError::malformed_route(
                &route.path,
                format!("invalid placeholder segment '{segment}'"),
            ));
        }
    }

    for param in &route.path_params {
        if param.trim().is_empty() {
            return Err(ProvisioningError::malformed_route(
                &route.path,
                "pathParams entries cannot be empty",
            ));
        }
    }

    if let Some(param) = route.primary_path_param() {
        let expected = format!("{{{param}}}");
        let greedy = format!("{{{param}+}}");
        if !segments.iter().any(|s| *s == expected || *s == greedy) {
            warn!(
                "Path parameter '{}' has no matching placeholder in {}",
                param, route.path
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateApiGatewayRequest {
        CreateApiGatewayRequest {
            stack_name: "dev".to_string(),
            api_name: "priceIntegration-dev".to_string(),
            routes: vec![RouteSpec::new("/v1/healthcheck", "GET")],
            description: "price integration".to_string(),
            url: "https://dev-priceintegration.example.com".to_string(),
            deployment_name: "devDeployment-1".to_string(),
            stage_name: "devv1".to_string(),
            domain_name: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_request(&request()).is_ok());
    }

    #[test]
    fn test_missing_stack_name() {
        let mut req = request();
        req.stack_name = "  ".to_string();
        assert!(matches!(
            validate_request(&req),
            Err(ProvisioningError::MissingStackName)
        ));
    }

    #[test]
    fn test_invalid_stack_name() {
        let err = validate_stack_name("dev stack").unwrap_err();
        assert_eq!(err.as_str(), "invalid_request");
        assert!(validate_stack_name("acme/price-integration.dev").is_ok());
    }

    #[test]
    fn test_backend_url() {
        assert!(validate_backend_url("http://localhost:8080").is_ok());
        assert!(validate_backend_url("https://api.example.com/base").is_ok());
        assert!(validate_backend_url("ftp://example.com").is_err());
        assert!(validate_backend_url("").is_err());
    }

    #[test]
    fn test_stage_name() {
        assert!(validate_stage_name("devv1").is_ok());
        assert!(validate_stage_name("dev v1").is_err());
        assert!(validate_stage_name("").is_err());
    }

    #[test]
    fn test_lowercase_method_is_malformed() {
        let err = validate_route(&RouteSpec::new("/v1/items", "get")).unwrap_err();
        assert_eq!(err.as_str(), "malformed_route");
    }

    #[test]
    fn test_placeholders() {
        assert!(validate_route(&RouteSpec::new("/items/{id}", "GET")).is_ok());
        assert!(validate_route(&RouteSpec::new("/proxy/{proxy+}", "ANY")).is_ok());
        assert!(validate_route(&RouteSpec::new("/items/{}", "GET")).is_err());
        assert!(validate_route(&RouteSpec::new("/items/{id", "GET")).is_err());
    }

    #[test]
    fn test_empty_path_param() {
        let route = RouteSpec::new("/items/{id}", "GET").with_path_params([""]);
        assert!(validate_route(&route).is_err());
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut req = request();
        req.routes.push(RouteSpec::new("/v1/healthcheck", "GET"));
        let err = validate_request(&req).unwrap_err();
        assert_eq!(err.as_str(), "malformed_route");
    }

    #[test]
    fn test_empty_route_list_is_rejected() {
        let mut req = request();
        req.routes.clear();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_invalid_domain_name() {
        let mut req = request();
        req.domain_name = Some("not a domain".to_string());
        assert!(validate_request(&req).is_err());
        assert!(validate_domain_name("api.dev.example.com").is_ok());
    }
}
