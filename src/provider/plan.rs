//! # Plan Recorder
//!
//! In-memory [`ProvisioningEngine`] that records every declaration in call order and
//! hands out deterministic identifiers (`res-3`, `method-7`, ...). Used by the `plan`
//! engine, `gwctl plan` and the test suite.

use super::declarations::*;
use super::ProvisioningEngine;
use crate::error::{ProvisioningError, ProvisioningResult};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// One recorded declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedDeclaration {
    pub sequence: usize,
    pub kind: DeclarationKind,
    pub name: String,
    pub id: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct PlanState {
    declarations: Vec<PlannedDeclaration>,
}

/// Recording engine
#[derive(Debug, Default)]
pub struct PlanRecorder {
    state: Mutex<PlanState>,
    failures: Vec<(DeclarationKind, String)>,
}

impl PlanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the declaration of `kind` named `name` with an engine error
    #[must_use]
    pub fn with_failure(mut self, kind: DeclarationKind, name: impl Into<String>) -> Self {
        self.failures.push((kind, name.into()));
        self
    }

    /// Every recorded declaration in call order
    pub fn declarations(&self) -> Vec<PlannedDeclaration> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .declarations
            .clone()
    }

    pub fn declarations_of(&self, kind: DeclarationKind) -> Vec<PlannedDeclaration> {
        self.declarations()
            .into_iter()
            .filter(|d| d.kind == kind)
            .collect()
    }

    pub fn count(&self, kind: DeclarationKind) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .declarations
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    }

    fn record<T: Serialize>(
        &self,
        kind: DeclarationKind,
        name: &str,
        payload: &T,
    ) -> ProvisioningResult<Handle> {
        if self
            .failures
            .iter()
            .any(|(k, n)| *k == kind && n == name)
        {
            return Err(ProvisioningError::engine(
                operation_for(kind),
                name,
                "injected failure",
            ));
        }

        let payload = serde_json::to_value(payload)
            .map_err(|e| ProvisioningError::engine(operation_for(kind), name, e.to_string()))?;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = state.declarations.len() + 1;
        let id = format!("{}-{}", id_prefix(kind), sequence);
        debug!(kind = %kind, name, id = %id, "plan.declare");
        state.declarations.push(PlannedDeclaration {
            sequence,
            kind,
            name: name.to_string(),
            id: id.clone(),
            payload,
        });

        Ok(Handle::new(kind, name, id))
    }
}

fn id_prefix(kind: DeclarationKind) -> &'static str {
    match kind {
        DeclarationKind::RestApi => "api",
        DeclarationKind::RequestValidator => "validator",
        DeclarationKind::Resource => "res",
        DeclarationKind::Model => "model",
        DeclarationKind::Method => "method",
        DeclarationKind::Integration => "integration",
        DeclarationKind::Deployment => "deployment",
        DeclarationKind::Stage => "stage",
        DeclarationKind::DomainName => "domain",
        DeclarationKind::BasePathMapping => "mapping",
        DeclarationKind::DnsRecord => "record",
    }
}

fn operation_for(kind: DeclarationKind) -> &'static str {
    match kind {
        DeclarationKind::RestApi => "declare_rest_api",
        DeclarationKind::RequestValidator => "declare_request_validator",
        DeclarationKind::Resource => "declare_resource",
        DeclarationKind::Model => "declare_model",
        DeclarationKind::Method => "declare_method",
        DeclarationKind::Integration => "declare_integration",
        DeclarationKind::Deployment => "declare_deployment",
        DeclarationKind::Stage => "declare_stage",
        DeclarationKind::DomainName => "declare_domain_name",
        DeclarationKind::BasePathMapping => "declare_base_path_mapping",
        DeclarationKind::DnsRecord => "declare_dns_record",
    }
}

#[async_trait]
impl ProvisioningEngine for PlanRecorder {
    async fn declare_rest_api(
        &self,
        declaration: &RestApiDeclaration,
    ) -> ProvisioningResult<RestApiHandle> {
        let handle = self.record(DeclarationKind::RestApi, &declaration.name, declaration)?;
        let root_resource_id = format!("{}-root", handle.id);
        Ok(RestApiHandle {
            handle,
            root_resource_id,
        })
    }

    async fn declare_request_validator(
        &self,
        _api: &RestApiHandle,
        declaration: &RequestValidatorDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(
            DeclarationKind::RequestValidator,
            &declaration.name,
            declaration,
        )
    }

    async fn declare_resource(
        &self,
        _api: &RestApiHandle,
        declaration: &ResourceDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(DeclarationKind::Resource, &declaration.name, declaration)
    }

    async fn declare_model(
        &self,
        _api: &RestApiHandle,
        declaration: &ModelDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(DeclarationKind::Model, &declaration.name, declaration)
    }

    async fn declare_method(
        &self,
        _api: &RestApiHandle,
        declaration: &MethodDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(DeclarationKind::Method, &declaration.name, declaration)
    }

    async fn declare_integration(
        &self,
        _api: &RestApiHandle,
        declaration: &IntegrationDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(DeclarationKind::Integration, &declaration.name, declaration)
    }

    async fn declare_deployment(
        &self,
        _api: &RestApiHandle,
        declaration: &DeploymentDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(DeclarationKind::Deployment, &declaration.name, declaration)
    }

    async fn declare_stage(
        &self,
        _api: &RestApiHandle,
        declaration: &StageDeclaration,
    ) -> ProvisioningResult<StageHandle> {
        let handle = self.record(DeclarationKind::Stage, &declaration.name, declaration)?;
        Ok(StageHandle {
            handle,
            stage_name: declaration.stage_name.clone(),
            invoke_url: None,
        })
    }

    async fn declare_domain_name(
        &self,
        declaration: &DomainDeclaration,
    ) -> ProvisioningResult<DomainHandle> {
        let handle = self.record(DeclarationKind::DomainName, &declaration.name, declaration)?;
        let regional_domain_name = format!("{}.regional.plan", handle.id);
        Ok(DomainHandle {
            handle,
            domain_name: declaration.domain_name.clone(),
            regional_domain_name,
            regional_zone_id: "PLANZONE".to_string(),
        })
    }

    async fn declare_base_path_mapping(
        &self,
        _api: &RestApiHandle,
        declaration: &BasePathMappingDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(
            DeclarationKind::BasePathMapping,
            &declaration.name,
            declaration,
        )
    }

    async fn declare_dns_record(
        &self,
        declaration: &DnsRecordDeclaration,
    ) -> ProvisioningResult<Handle> {
        self.record(DeclarationKind::DnsRecord, &declaration.name, declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str) -> ResourceDeclaration {
        ResourceDeclaration {
            name: name.to_string(),
            path_part: name.to_string(),
            parent_id: "api-1-root".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_follow_call_order() {
        let recorder = PlanRecorder::new();
        let api = recorder
            .declare_rest_api(&RestApiDeclaration {
                name: "demo".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let v1 = recorder.declare_resource(&api, &resource("v1")).await.unwrap();

        assert_eq!(api.id(), "api-1");
        assert_eq!(api.root_resource_id, "api-1-root");
        assert_eq!(v1.id, "res-2");
        assert_eq!(recorder.count(DeclarationKind::Resource), 1);
        assert_eq!(recorder.declarations()[1].payload["path_part"], "v1");
    }

    #[tokio::test]
    async fn test_injected_failure_records_nothing() {
        let recorder = PlanRecorder::new().with_failure(DeclarationKind::Resource, "v1");
        let api = recorder
            .declare_rest_api(&RestApiDeclaration {
                name: "demo".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        let err = recorder
            .declare_resource(&api, &resource("v1"))
            .await
            .unwrap_err();
        assert_eq!(err.as_str(), "engine_failure");
        assert_eq!(recorder.count(DeclarationKind::Resource), 0);
    }
}
