//! # API Gateway Provisioning
//!
//! One provisioning run turns a [`CreateApiGatewayRequest`] into declarations against a
//! [`ProvisioningEngine`]:
//!
//! 1. Validate the request. Nothing is declared for a rejected request.
//! 2. Declare the REST API and its request validator.
//! 3. For each route in order: resolve the resource chain, declare the request model,
//!    attach the method and integration.
//! 4. Finalize: deployment, stage and the optional custom domain.
//!
//! Runs are sequential and own their [`ProvisioningSession`]. Concurrent runs share
//! nothing.

pub mod deployment;
pub mod method;
pub mod naming;
pub mod registry;
pub mod resolver;

pub use deployment::{finalize, DeploymentOutcome};
pub use method::{attach_method_and_integration, declare_request_model, AttachedMethod};
pub use naming::{ResourceKey, ResourceKeyStrategy};
pub use registry::ProvisioningSession;
pub use resolver::{resolve_route, ResolvedRoute};

use crate::constants::DEFAULT_REQUEST_VALIDATOR_NAME;
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::observability::metrics;
use crate::provider::plan::PlannedDeclaration;
use crate::provider::{
    Handle, PlanRecorder, ProvisioningEngine, RequestValidatorDeclaration, RestApiDeclaration,
    RestApiHandle,
};
use crate::request::CreateApiGatewayRequest;
use crate::validation::validate_request;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Custom domain to declare during finalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTarget {
    pub domain_name: String,
    pub certificate_arn: String,
    pub hosted_zone_id: String,
}

/// Immutable configuration of one run
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub api: RestApiHandle,
    pub request_validator: Handle,
    /// Backend base URL
    pub url: String,
    pub deployment_name: String,
    pub stage_name: String,
    pub domain: Option<DomainTarget>,
}

/// Certificate and hosted zone used when a request asks for a custom domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSettings {
    pub certificate_arn: Option<String>,
    pub hosted_zone_id: Option<String>,
}

impl DomainSettings {
    /// Combine the requested domain with the configured certificate and zone
    pub fn target_for(&self, domain_name: &str) -> ProvisioningResult<DomainTarget> {
        let certificate_arn = self.certificate_arn.clone().ok_or_else(|| {
            ProvisioningError::InvalidRequest(format!(
                "custom domain '{domain_name}' requested but DOMAIN_CERTIFICATE_ARN is not configured"
            ))
        })?;
        let hosted_zone_id = self.hosted_zone_id.clone().ok_or_else(|| {
            ProvisioningError::InvalidRequest(format!(
                "custom domain '{domain_name}' requested but DOMAIN_HOSTED_ZONE_ID is not configured"
            ))
        })?;

        Ok(DomainTarget {
            domain_name: domain_name.to_string(),
            certificate_arn,
            hosted_zone_id,
        })
    }
}

/// Settings shared by every run of a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub request_validator_name: String,
    pub key_strategy: ResourceKeyStrategy,
    pub domain: DomainSettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            request_validator_name: DEFAULT_REQUEST_VALIDATOR_NAME.to_string(),
            key_strategy: ResourceKeyStrategy::default(),
            domain: DomainSettings::default(),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningReport {
    pub run_id: Uuid,
    pub stack_name: String,
    pub api_name: String,
    pub api_id: String,
    pub root_resource_id: String,
    pub key_strategy: ResourceKeyStrategy,
    /// Resource keys in declaration order
    pub resource_keys: Vec<ResourceKey>,
    pub resources_declared: usize,
    pub models_declared: usize,
    pub methods_declared: usize,
    pub deployment_id: String,
    pub stage_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoke_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Report of a run against the plan engine together with everything it declared
#[derive(Debug, Clone, Serialize)]
pub struct PlanDocument {
    pub report: ProvisioningReport,
    pub declarations: Vec<PlannedDeclaration>,
}

/// Provisioning orchestrator
#[derive(Debug, Clone, Default)]
pub struct ApiGateway {
    settings: GatewaySettings,
}

impl ApiGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Provision `request` through `engine`.
    ///
    /// Client errors are returned before the first declaration. An engine error aborts
    /// the run and leaves earlier declarations in place.
    pub async fn provision(
        &self,
        engine: &dyn ProvisioningEngine,
        request: &CreateApiGatewayRequest,
    ) -> ProvisioningResult<ProvisioningReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "apigateway.provision",
            run.id = %run_id,
            stack.name = %request.stack_name,
            api.name = %request.api_name,
            routes = request.routes.len()
        );
        let start = Instant::now();

        let result = self
            .run(engine, request, run_id)
            .instrument(span)
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.as_str(),
        };
        metrics::increment_provisioning_runs(outcome);
        metrics::observe_provisioning_duration(start.elapsed().as_secs_f64());
        result
    }

    /// Provision `request` against a fresh [`PlanRecorder`]
    pub async fn plan(&self, request: &CreateApiGatewayRequest) -> ProvisioningResult<PlanDocument> {
        let recorder = PlanRecorder::new();
        let report = self.provision(&recorder, request).await?;
        Ok(PlanDocument {
            report,
            declarations: recorder.declarations(),
        })
    }

    async fn run(
        &self,
        engine: &dyn ProvisioningEngine,
        request: &CreateApiGatewayRequest,
        run_id: Uuid,
    ) -> ProvisioningResult<ProvisioningReport> {
        validate_request(request)?;
        let domain = request
            .custom_domain()
            .map(|name| self.settings.domain.target_for(name))
            .transpose()?;

        let started_at = Utc::now();
        info!(
            "Provisioning API {} with {} routes",
            request.api_name,
            request.routes.len()
        );

        let api = engine
            .declare_rest_api(&RestApiDeclaration {
                name: request.api_name.clone(),
                description: request.description.clone(),
            })
            .await?;
        let request_validator = engine
            .declare_request_validator(
                &api,
                &RequestValidatorDeclaration {
                    name: self.settings.request_validator_name.clone(),
                    validate_request_body: true,
                    validate_request_parameters: true,
                },
            )
            .await?;

        let ctx = GatewayContext {
            api,
            request_validator,
            url: request.url.clone(),
            deployment_name: request.deployment_name.clone(),
            stage_name: request.stage_name.clone(),
            domain,
        };
        let mut session = ProvisioningSession::new(self.settings.key_strategy);
        let mut models_declared = 0;

        for route in &request.routes {
            let resolved = resolve_route(
                engine,
                &ctx.api,
                session.key_strategy,
                route,
                &mut session.resources,
                &mut session.child_resources,
            )
            .await?;

            let terminal = resolved.terminal_segment();
            if declare_request_model(engine, &ctx, terminal, route, &mut session.request_models)
                .await?
                .is_some()
            {
                models_declared += 1;
            }

            let model_name = session.request_models.get(terminal).map(str::to_string);
            attach_method_and_integration(
                engine,
                &ctx,
                &resolved.resource,
                route,
                model_name.as_deref(),
                &mut session.methods,
            )
            .await?;
        }

        let outcome = finalize(engine, &ctx, &session.methods).await?;

        metrics::increment_declarations("resource", session.resources.len());
        metrics::increment_declarations("model", models_declared);
        metrics::increment_declarations("method", session.methods.len());

        info!(
            "Provisioned API {} ({}): {} resources, {} models, {} methods",
            request.api_name,
            ctx.api.id(),
            session.resources.len(),
            models_declared,
            session.methods.len()
        );

        Ok(ProvisioningReport {
            run_id,
            stack_name: request.stack_name.clone(),
            api_name: request.api_name.clone(),
            api_id: ctx.api.id().to_string(),
            root_resource_id: ctx.api.root_resource_id.clone(),
            key_strategy: session.key_strategy,
            resource_keys: session.resources.keys().to_vec(),
            resources_declared: session.resources.len(),
            models_declared,
            methods_declared: session.methods.len(),
            deployment_id: outcome.deployment.id.clone(),
            stage_name: outcome.stage.stage_name.clone(),
            invoke_url: outcome.stage.invoke_url.clone(),
            custom_domain: outcome.domain.map(|d| d.domain.domain_name),
            started_at,
            finished_at: Utc::now(),
        })
    }
}
