//! # Provisioning Engines
//!
//! The provisioner consumes infrastructure through the [`ProvisioningEngine`] trait:
//! declare an object, get back a handle. Two engines are provided:
//!
//! - `aws`: AWS API Gateway and Route 53 through the official AWS Rust SDK
//! - `plan`: in-memory recorder with deterministic ids, used for dry runs and tests

pub mod aws;
pub mod declarations;
pub mod plan;

pub use declarations::*;
pub use plan::PlanRecorder;

use crate::error::ProvisioningResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability interface to the external provisioning engine.
///
/// Calls for one run are issued sequentially. A failed call aborts the run and
/// whatever was already declared stays declared.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    async fn declare_rest_api(&self, declaration: &RestApiDeclaration)
        -> ProvisioningResult<RestApiHandle>;

    async fn declare_request_validator(
        &self,
        api: &RestApiHandle,
        declaration: &RequestValidatorDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_resource(
        &self,
        api: &RestApiHandle,
        declaration: &ResourceDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_model(
        &self,
        api: &RestApiHandle,
        declaration: &ModelDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_method(
        &self,
        api: &RestApiHandle,
        declaration: &MethodDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_integration(
        &self,
        api: &RestApiHandle,
        declaration: &IntegrationDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_deployment(
        &self,
        api: &RestApiHandle,
        declaration: &DeploymentDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_stage(
        &self,
        api: &RestApiHandle,
        declaration: &StageDeclaration,
    ) -> ProvisioningResult<StageHandle>;

    async fn declare_domain_name(
        &self,
        declaration: &DomainDeclaration,
    ) -> ProvisioningResult<DomainHandle>;

    async fn declare_base_path_mapping(
        &self,
        api: &RestApiHandle,
        declaration: &BasePathMappingDeclaration,
    ) -> ProvisioningResult<Handle>;

    async fn declare_dns_record(
        &self,
        declaration: &DnsRecordDeclaration,
    ) -> ProvisioningResult<Handle>;
}

/// Engine selected for the control surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Record declarations and write a JSON plan per stack
    #[default]
    Plan,
    /// Declare against AWS
    Aws,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plan" => Ok(EngineKind::Plan),
            "aws" => Ok(EngineKind::Aws),
            other => Err(format!(
                "unknown provisioning engine '{other}' (expected 'plan' or 'aws')"
            )),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Plan => f.write_str("plan"),
            EngineKind::Aws => f.write_str("aws"),
        }
    }
}
