//! # Finalize
//!
//! Deployment, stage and optional custom domain, declared once every route of the run
//! has been attached. Each declaration lists the handles it depends on:
//!
//! ```text
//! methods ──▶ deployment ──▶ stage ──▶ domain ──▶ DNS alias record
//!                              │          │
//!                              └──────────┴──▶ base path mapping
//! ```

use super::registry::MethodDependencySet;
use super::GatewayContext;
use crate::constants::{
    BASE_PATH_MAPPING_DECLARATION_NAME, DNS_RECORD_DECLARATION_NAME, DOMAIN_DECLARATION_NAME,
};
use crate::error::ProvisioningResult;
use crate::provider::{
    BasePathMappingDeclaration, DeploymentDeclaration, DnsRecordDeclaration, DomainDeclaration,
    DomainHandle, Handle, ProvisioningEngine, StageDeclaration, StageHandle,
};
use serde::Serialize;
use tracing::info;

/// Handles declared by [`finalize`]
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentOutcome {
    pub deployment: Handle,
    pub stage: StageHandle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<CustomDomainOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomDomainOutcome {
    pub domain: DomainHandle,
    pub base_path_mapping: Handle,
    pub dns_record: Handle,
}

/// Declare the deployment over every attached method, then its stage and custom domain
pub async fn finalize(
    engine: &dyn ProvisioningEngine,
    ctx: &GatewayContext,
    methods: &MethodDependencySet,
) -> ProvisioningResult<DeploymentOutcome> {
    let deployment = engine
        .declare_deployment(
            &ctx.api,
            &DeploymentDeclaration {
                name: ctx.deployment_name.clone(),
                depends_on: methods.as_slice().to_vec(),
            },
        )
        .await?;

    let stage = engine
        .declare_stage(
            &ctx.api,
            &StageDeclaration {
                name: ctx.stage_name.clone(),
                stage_name: ctx.stage_name.clone(),
                deployment_id: deployment.id.clone(),
                depends_on: vec![deployment.clone()],
            },
        )
        .await?;
    info!(
        "Deployment {} published to stage {}",
        deployment.id, stage.stage_name
    );

    let Some(target) = &ctx.domain else {
        return Ok(DeploymentOutcome {
            deployment,
            stage,
            domain: None,
        });
    };

    let domain = engine
        .declare_domain_name(&DomainDeclaration {
            name: DOMAIN_DECLARATION_NAME.to_string(),
            domain_name: target.domain_name.clone(),
            regional_certificate_arn: target.certificate_arn.clone(),
            depends_on: vec![stage.handle.clone()],
        })
        .await?;

    let base_path_mapping = engine
        .declare_base_path_mapping(
            &ctx.api,
            &BasePathMappingDeclaration {
                name: BASE_PATH_MAPPING_DECLARATION_NAME.to_string(),
                domain_name: domain.domain_name.clone(),
                stage_name: stage.stage_name.clone(),
                depends_on: vec![stage.handle.clone(), domain.handle.clone()],
            },
        )
        .await?;

    let dns_record = engine
        .declare_dns_record(&DnsRecordDeclaration {
            name: DNS_RECORD_DECLARATION_NAME.to_string(),
            record_name: domain.domain_name.clone(),
            hosted_zone_id: target.hosted_zone_id.clone(),
            alias_name: domain.regional_domain_name.clone(),
            alias_zone_id: domain.regional_zone_id.clone(),
            evaluate_target_health: true,
            depends_on: vec![domain.handle.clone()],
        })
        .await?;
    info!("Custom domain {} mapped to stage {}", domain.domain_name, stage.stage_name);

    Ok(DeploymentOutcome {
        deployment,
        stage,
        domain: Some(CustomDomainOutcome {
            domain,
            base_path_mapping,
            dns_record,
        }),
    })
}
