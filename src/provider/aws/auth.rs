//! # AWS SDK Configuration
//!
//! Builds the shared `SdkConfig` used by the API Gateway and Route 53 clients.

use anyhow::Result;
use aws_config::SdkConfig;
use tracing::info;

/// Create AWS SDK config using the default credential chain
///
/// Credentials come from the environment, the shared profile files or the instance /
/// task role, in the SDK's usual order. `endpoint_url` routes every request to a local
/// mock (LocalStack, moto) instead of AWS.
pub async fn create_sdk_config(region: &str, endpoint_url: Option<&str>) -> Result<SdkConfig> {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    if let Some(endpoint) = endpoint_url {
        info!(
            "Endpoint override enabled: routing API Gateway and Route 53 requests to {}",
            endpoint
        );
        builder = builder.endpoint_url(endpoint);
    } else {
        info!("Using default AWS endpoints for region {}", region);
    }

    let sdk_config = builder.load().await;

    Ok(sdk_config)
}
