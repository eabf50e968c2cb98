//! # Provisioning Backend
//!
//! Engine used by the control surface, selected by `PROVISIONING_ENGINE`.

use crate::config::ProvisioningConfig;
use crate::error::ProvisioningResult;
use crate::gateway::{ApiGateway, PlanDocument, ProvisioningReport};
use crate::provider::aws::AwsApiGateway;
use crate::provider::EngineKind;
use crate::request::CreateApiGatewayRequest;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug)]
pub enum ProvisioningBackend {
    /// Record each run and write `<output_dir>/<stack>.json`
    Plan { output_dir: PathBuf },
    /// Declare against AWS
    Aws(AwsApiGateway),
}

impl ProvisioningBackend {
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn from_config(config: &ProvisioningConfig) -> Result<Self> {
        match config.engine {
            EngineKind::Plan => {
                info!(
                    "Using plan engine, plans are written to {}",
                    config.plan_output_dir.display()
                );
                Ok(Self::Plan {
                    output_dir: config.plan_output_dir.clone(),
                })
            }
            EngineKind::Aws => {
                info!("Using AWS engine in region {}", config.aws_region);
                let engine =
                    AwsApiGateway::new(&config.aws_region, config.aws_endpoint_url.as_deref())
                        .await
                        .context("Failed to create AWS API Gateway clients")?;
                Ok(Self::Aws(engine))
            }
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Plan { .. } => EngineKind::Plan,
            Self::Aws(_) => EngineKind::Aws,
        }
    }

    /// Run one provisioning pass for `request`
    pub async fn provision(
        &self,
        gateway: &ApiGateway,
        request: &CreateApiGatewayRequest,
    ) -> ProvisioningResult<ProvisioningReport> {
        match self {
            Self::Aws(engine) => gateway.provision(engine, request).await,
            Self::Plan { output_dir } => {
                let document = gateway.plan(request).await?;
                // The run succeeded, a plan that cannot be written is only logged
                match write_plan(output_dir, &request.stack_name, &document).await {
                    Ok(path) => info!("Wrote plan for stack {} to {}", request.stack_name, path.display()),
                    Err(e) => warn!("{:#}", e),
                }
                Ok(document.report)
            }
        }
    }
}

/// Plan file for a stack. `/` in organisation-qualified names becomes `_`.
pub fn plan_path(output_dir: &Path, stack_name: &str) -> PathBuf {
    output_dir.join(format!("{}.json", stack_name.replace('/', "_")))
}

async fn write_plan(output_dir: &Path, stack_name: &str, document: &PlanDocument) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create plan directory {}", output_dir.display()))?;

    let path = plan_path(output_dir, stack_name);
    let contents =
        serde_json::to_string_pretty(document).context("Failed to serialize plan document")?;
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write plan {}", path.display()))?;
    Ok(path)
}
