//! # AWS API Gateway Engine
//!
//! [`ProvisioningEngine`] backed by the official AWS Rust SDK.
//!
//! This module provides functionality to:
//! - Create REST APIs, request validators, resources, models, methods and integrations
//! - Create deployments and stages, in the order the gateway layer issues them
//! - Create regional custom domains with base path mappings
//! - Upsert Route 53 alias records for custom domains
//!
//! Dependencies between declarations are honoured by call order: every call is awaited
//! before the next one is issued.

mod auth;

use crate::error::{ProvisioningError, ProvisioningResult};
use crate::observability::metrics;
use crate::provider::declarations::*;
use crate::provider::ProvisioningEngine;
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_apigateway::error::DisplayErrorContext;
use aws_sdk_apigateway::types::{EndpointConfiguration, EndpointType, IntegrationType};
use aws_sdk_apigateway::Client as ApiGatewayClient;
use aws_sdk_route53::types::{
    AliasTarget, Change, ChangeAction, ChangeBatch, ResourceRecordSet, RrType,
};
use aws_sdk_route53::Client as Route53Client;
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

pub use self::auth::create_sdk_config;

/// AWS API Gateway provisioning engine
pub struct AwsApiGateway {
    pub(crate) apigateway: ApiGatewayClient,
    pub(crate) route53: Route53Client,
    pub(crate) region: String,
}

impl std::fmt::Debug for AwsApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsApiGateway")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsApiGateway {
    /// Create API Gateway and Route 53 clients sharing one SDK config
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn new(region: &str, endpoint_url: Option<&str>) -> Result<Self> {
        let sdk_config = create_sdk_config(region, endpoint_url).await?;

        Ok(Self {
            apigateway: ApiGatewayClient::new(&sdk_config),
            route53: Route53Client::new(&sdk_config),
            region: region.to_string(),
        })
    }

    async fn root_resource_id(&self, api_id: &str, api_name: &str) -> ProvisioningResult<String> {
        let resources = self
            .apigateway
            .get_resources()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(|e| sdk_error("declare_rest_api", api_name, e))?;

        resources
            .items()
            .iter()
            .find(|resource| resource.path() == Some("/"))
            .and_then(|resource| resource.id())
            .map(str::to_string)
            .ok_or_else(|| missing_field("declare_rest_api", api_name, "root resource"))
    }
}

fn sdk_error<E: std::error::Error>(
    operation: &'static str,
    name: &str,
    err: E,
) -> ProvisioningError {
    ProvisioningError::engine(operation, name, DisplayErrorContext(err).to_string())
}

fn missing_field(operation: &'static str, name: &str, field: &str) -> ProvisioningError {
    ProvisioningError::engine(operation, name, format!("response did not include {field}"))
}

/// Run one SDK call inside a span and record its duration and outcome
async fn observe<T, F>(kind: DeclarationKind, name: &str, call: F) -> ProvisioningResult<T>
where
    F: Future<Output = ProvisioningResult<T>>,
{
    let span = info_span!(
        "apigateway.aws.declare",
        declaration.kind = %kind,
        declaration.name = name
    );
    let start = Instant::now();

    let result = call.instrument(span).await;

    metrics::record_engine_call(kind.as_str(), start.elapsed().as_secs_f64());
    if result.is_err() {
        metrics::increment_engine_errors(kind.as_str());
    }
    result
}

#[async_trait]
impl ProvisioningEngine for AwsApiGateway {
    async fn declare_rest_api(
        &self,
        declaration: &RestApiDeclaration,
    ) -> ProvisioningResult<RestApiHandle> {
        observe(DeclarationKind::RestApi, &declaration.name, async {
            info!("Creating REST API: {}", declaration.name);
            let output = self
                .apigateway
                .create_rest_api()
                .name(&declaration.name)
                .description(&declaration.description)
                .send()
                .await
                .map_err(|e| sdk_error("declare_rest_api", &declaration.name, e))?;

            let api_id = output
                .id()
                .ok_or_else(|| missing_field("declare_rest_api", &declaration.name, "id"))?
                .to_string();
            let root_resource_id = self.root_resource_id(&api_id, &declaration.name).await?;

            Ok(RestApiHandle {
                handle: Handle::new(DeclarationKind::RestApi, &declaration.name, api_id),
                root_resource_id,
            })
        })
        .await
    }

    async fn declare_request_validator(
        &self,
        api: &RestApiHandle,
        declaration: &RequestValidatorDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::RequestValidator, &declaration.name, async {
            let output = self
                .apigateway
                .create_request_validator()
                .rest_api_id(api.id())
                .name(&declaration.name)
                .validate_request_body(declaration.validate_request_body)
                .validate_request_parameters(declaration.validate_request_parameters)
                .send()
                .await
                .map_err(|e| sdk_error("declare_request_validator", &declaration.name, e))?;

            let id = output.id().ok_or_else(|| {
                missing_field("declare_request_validator", &declaration.name, "id")
            })?;
            Ok(Handle::new(
                DeclarationKind::RequestValidator,
                &declaration.name,
                id,
            ))
        })
        .await
    }

    async fn declare_resource(
        &self,
        api: &RestApiHandle,
        declaration: &ResourceDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::Resource, &declaration.name, async {
            let output = self
                .apigateway
                .create_resource()
                .rest_api_id(api.id())
                .parent_id(&declaration.parent_id)
                .path_part(&declaration.path_part)
                .send()
                .await
                .map_err(|e| sdk_error("declare_resource", &declaration.name, e))?;

            let id = output
                .id()
                .ok_or_else(|| missing_field("declare_resource", &declaration.name, "id"))?;
            debug!(
                "Created resource {} ({}) under {}",
                declaration.path_part, id, declaration.parent_id
            );
            Ok(Handle::new(DeclarationKind::Resource, &declaration.name, id))
        })
        .await
    }

    async fn declare_model(
        &self,
        api: &RestApiHandle,
        declaration: &ModelDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::Model, &declaration.name, async {
            let output = self
                .apigateway
                .create_model()
                .rest_api_id(api.id())
                .name(&declaration.name)
                .description(&declaration.description)
                .content_type(&declaration.content_type)
                .schema(declaration.schema.to_string())
                .send()
                .await
                .map_err(|e| sdk_error("declare_model", &declaration.name, e))?;

            let id = output.id().unwrap_or(&declaration.name);
            Ok(Handle::new(DeclarationKind::Model, &declaration.name, id))
        })
        .await
    }

    async fn declare_method(
        &self,
        api: &RestApiHandle,
        declaration: &MethodDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::Method, &declaration.name, async {
            let request_parameters: HashMap<String, bool> = declaration
                .request_parameters
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect();
            let request_models: HashMap<String, String> = declaration
                .request_models
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            self.apigateway
                .put_method()
                .rest_api_id(api.id())
                .resource_id(&declaration.resource_id)
                .http_method(&declaration.http_method)
                .authorization_type(&declaration.authorization)
                .set_request_parameters(Some(request_parameters))
                .set_request_validator_id(declaration.request_validator_id.clone())
                .set_request_models(Some(request_models))
                .send()
                .await
                .map_err(|e| sdk_error("declare_method", &declaration.name, e))?;

            // Methods are addressed by resource and verb, they have no id of their own
            let id = format!("{}:{}", declaration.resource_id, declaration.http_method);
            Ok(Handle::new(DeclarationKind::Method, &declaration.name, id))
        })
        .await
    }

    async fn declare_integration(
        &self,
        api: &RestApiHandle,
        declaration: &IntegrationDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::Integration, &declaration.name, async {
            let request_parameters: HashMap<String, String> = declaration
                .request_parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            self.apigateway
                .put_integration()
                .rest_api_id(api.id())
                .resource_id(&declaration.resource_id)
                .http_method(&declaration.http_method)
                .integration_http_method(&declaration.integration_http_method)
                .r#type(IntegrationType::from(declaration.integration_type.as_str()))
                .uri(&declaration.uri)
                .set_request_parameters(Some(request_parameters))
                .send()
                .await
                .map_err(|e| sdk_error("declare_integration", &declaration.name, e))?;

            let id = format!(
                "{}:{}:integration",
                declaration.resource_id, declaration.http_method
            );
            Ok(Handle::new(DeclarationKind::Integration, &declaration.name, id))
        })
        .await
    }

    async fn declare_deployment(
        &self,
        api: &RestApiHandle,
        declaration: &DeploymentDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::Deployment, &declaration.name, async {
            info!(
                "Creating deployment {} after {} method declarations",
                declaration.name,
                declaration.depends_on.len()
            );
            let output = self
                .apigateway
                .create_deployment()
                .rest_api_id(api.id())
                .description(&declaration.name)
                .send()
                .await
                .map_err(|e| sdk_error("declare_deployment", &declaration.name, e))?;

            let id = output
                .id()
                .ok_or_else(|| missing_field("declare_deployment", &declaration.name, "id"))?;
            Ok(Handle::new(DeclarationKind::Deployment, &declaration.name, id))
        })
        .await
    }

    async fn declare_stage(
        &self,
        api: &RestApiHandle,
        declaration: &StageDeclaration,
    ) -> ProvisioningResult<StageHandle> {
        observe(DeclarationKind::Stage, &declaration.name, async {
            self.apigateway
                .create_stage()
                .rest_api_id(api.id())
                .stage_name(&declaration.stage_name)
                .deployment_id(&declaration.deployment_id)
                .send()
                .await
                .map_err(|e| sdk_error("declare_stage", &declaration.name, e))?;

            let invoke_url = format!(
                "https://{}.execute-api.{}.amazonaws.com/{}",
                api.id(),
                self.region,
                declaration.stage_name
            );
            Ok(StageHandle {
                handle: Handle::new(
                    DeclarationKind::Stage,
                    &declaration.name,
                    format!("{}/{}", api.id(), declaration.stage_name),
                ),
                stage_name: declaration.stage_name.clone(),
                invoke_url: Some(invoke_url),
            })
        })
        .await
    }

    async fn declare_domain_name(
        &self,
        declaration: &DomainDeclaration,
    ) -> ProvisioningResult<DomainHandle> {
        observe(DeclarationKind::DomainName, &declaration.name, async {
            let output = self
                .apigateway
                .create_domain_name()
                .domain_name(&declaration.domain_name)
                .regional_certificate_arn(&declaration.regional_certificate_arn)
                .endpoint_configuration(
                    EndpointConfiguration::builder()
                        .types(EndpointType::Regional)
                        .build(),
                )
                .send()
                .await
                .map_err(|e| sdk_error("declare_domain_name", &declaration.name, e))?;

            let regional_domain_name = output
                .regional_domain_name()
                .ok_or_else(|| {
                    missing_field("declare_domain_name", &declaration.name, "regional domain name")
                })?
                .to_string();
            let regional_zone_id = output
                .regional_hosted_zone_id()
                .ok_or_else(|| {
                    missing_field("declare_domain_name", &declaration.name, "regional zone id")
                })?
                .to_string();

            Ok(DomainHandle {
                handle: Handle::new(
                    DeclarationKind::DomainName,
                    &declaration.name,
                    &declaration.domain_name,
                ),
                domain_name: declaration.domain_name.clone(),
                regional_domain_name,
                regional_zone_id,
            })
        })
        .await
    }

    async fn declare_base_path_mapping(
        &self,
        api: &RestApiHandle,
        declaration: &BasePathMappingDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::BasePathMapping, &declaration.name, async {
            let output = self
                .apigateway
                .create_base_path_mapping()
                .domain_name(&declaration.domain_name)
                .rest_api_id(api.id())
                .stage(&declaration.stage_name)
                .send()
                .await
                .map_err(|e| sdk_error("declare_base_path_mapping", &declaration.name, e))?;

            let base_path = output.base_path().unwrap_or("(none)");
            Ok(Handle::new(
                DeclarationKind::BasePathMapping,
                &declaration.name,
                format!("{}/{}", declaration.domain_name, base_path),
            ))
        })
        .await
    }

    async fn declare_dns_record(
        &self,
        declaration: &DnsRecordDeclaration,
    ) -> ProvisioningResult<Handle> {
        observe(DeclarationKind::DnsRecord, &declaration.name, async {
            let op = "declare_dns_record";
            let build_error = |e: aws_sdk_route53::error::BuildError| {
                ProvisioningError::engine(op, &declaration.name, e.to_string())
            };

            let alias = AliasTarget::builder()
                .hosted_zone_id(&declaration.alias_zone_id)
                .dns_name(&declaration.alias_name)
                .evaluate_target_health(declaration.evaluate_target_health)
                .build()
                .map_err(build_error)?;
            let record_set = ResourceRecordSet::builder()
                .name(&declaration.record_name)
                .r#type(RrType::A)
                .alias_target(alias)
                .build()
                .map_err(build_error)?;
            let change = Change::builder()
                .action(ChangeAction::Upsert)
                .resource_record_set(record_set)
                .build()
                .map_err(build_error)?;
            let batch = ChangeBatch::builder()
                .changes(change)
                .build()
                .map_err(build_error)?;

            let output = self
                .route53
                .change_resource_record_sets()
                .hosted_zone_id(&declaration.hosted_zone_id)
                .change_batch(batch)
                .send()
                .await
                .map_err(|e| sdk_error(op, &declaration.name, e))?;
            debug!(?output, "Route 53 change submitted");

            Ok(Handle::new(
                DeclarationKind::DnsRecord,
                &declaration.name,
                format!("{}/{}", declaration.hosted_zone_id, declaration.record_name),
            ))
        })
        .await
    }
}
