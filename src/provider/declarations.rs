//! # Declarations
//!
//! Handles returned by a provisioning engine and the declaration payloads passed to it.
//! Every payload carries the logical declaration name so engines can log it and keep
//! it unique within one API.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of object declared against the provisioning engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    RestApi,
    RequestValidator,
    Resource,
    Model,
    Method,
    Integration,
    Deployment,
    Stage,
    DomainName,
    BasePathMapping,
    DnsRecord,
}

impl DeclarationKind {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::RestApi => "rest_api",
            DeclarationKind::RequestValidator => "request_validator",
            DeclarationKind::Resource => "resource",
            DeclarationKind::Model => "model",
            DeclarationKind::Method => "method",
            DeclarationKind::Integration => "integration",
            DeclarationKind::Deployment => "deployment",
            DeclarationKind::Stage => "stage",
            DeclarationKind::DomainName => "domain_name",
            DeclarationKind::BasePathMapping => "base_path_mapping",
            DeclarationKind::DnsRecord => "dns_record",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Opaque handle to a declared object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Handle {
    pub kind: DeclarationKind,
    /// Logical declaration name
    pub name: String,
    /// Identifier assigned by the engine
    pub id: String,
}

impl Handle {
    pub fn new(kind: DeclarationKind, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Handle to a declared REST API together with its root resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestApiHandle {
    pub handle: Handle,
    pub root_resource_id: String,
}

impl RestApiHandle {
    pub fn id(&self) -> &str {
        &self.handle.id
    }
}

/// Handle to a declared stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageHandle {
    pub handle: Handle,
    pub stage_name: String,
    /// Public invoke URL when the engine knows it
    pub invoke_url: Option<String>,
}

/// Handle to a declared regional custom domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainHandle {
    pub handle: Handle,
    pub domain_name: String,
    pub regional_domain_name: String,
    pub regional_zone_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestApiDeclaration {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestValidatorDeclaration {
    pub name: String,
    pub validate_request_body: bool,
    pub validate_request_parameters: bool,
}

/// One node of the resource hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDeclaration {
    /// Provisioning name, disambiguated when the path part recurs under another parent
    pub name: String,
    /// Segment exposed in the URL
    pub path_part: String,
    /// Parent resource id, the API root resource for first-level segments
    pub parent_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDeclaration {
    pub name: String,
    pub description: String,
    pub content_type: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub resource_id: String,
    pub http_method: String,
    pub authorization: String,
    /// `method.request.path.<param>` → required
    pub request_parameters: BTreeMap<String, bool>,
    pub request_validator_id: Option<String>,
    /// Content type → model name
    pub request_models: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationDeclaration {
    pub name: String,
    pub resource_id: String,
    /// Method the integration is attached to
    pub http_method: String,
    /// Method used against the backend
    pub integration_http_method: String,
    pub integration_type: String,
    pub uri: String,
    /// `integration.request.path.<param>` → `method.request.path.<param>`
    pub request_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentDeclaration {
    pub name: String,
    pub depends_on: Vec<Handle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageDeclaration {
    pub name: String,
    pub stage_name: String,
    pub deployment_id: String,
    pub depends_on: Vec<Handle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainDeclaration {
    pub name: String,
    pub domain_name: String,
    pub regional_certificate_arn: String,
    pub depends_on: Vec<Handle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasePathMappingDeclaration {
    pub name: String,
    pub domain_name: String,
    pub stage_name: String,
    pub depends_on: Vec<Handle>,
}

/// Route 53 `A` alias record pointing a custom domain at its regional endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecordDeclaration {
    pub name: String,
    pub record_name: String,
    pub hosted_zone_id: String,
    pub alias_name: String,
    pub alias_zone_id: String,
    pub evaluate_target_health: bool,
    pub depends_on: Vec<Handle>,
}
