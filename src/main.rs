//! # API Gateway Provisioner
//!
//! HTTP control surface that provisions AWS API Gateway stacks.
//!
//! ## Overview
//!
//! A `POST /api/createapigateway` request carries a stack name, an API name, a backend
//! URL and a flat list of routes. The provisioner:
//!
//! 1. **Registers the stack name** - duplicates are rejected before anything is declared
//! 2. **Initializes the stack** - `pulumi stack init <name>` when the CLI is available
//! 3. **Resolves routes** - builds a deduplicated resource tree from the route paths
//! 4. **Declares the gateway** - models, methods, HTTP proxy integrations, deployment, stage
//!    and an optional custom domain with its Route 53 alias
//! 5. **Applies the stack** - `pulumi up --skip-preview`
//!
//! The `plan` engine (default) records every declaration and writes one JSON plan per
//! stack. The `aws` engine declares against AWS through the official SDK.
//!
//! ## Usage
//!
//! See the [README.md](../README.md) for configuration and examples.

use anyhow::Result;
use apigateway_provisioner::runtime::initialization::initialize;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize().await?;
    info!(
        "Control surface initialized on port {}",
        init_result.server_config.port
    );

    tokio::select! {
        result = init_result.server_handle => {
            if let Err(e) = result {
                error!("HTTP server task failed: {}", e);
            }
            Err(anyhow::anyhow!("HTTP server stopped"))
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting");
            Ok(())
        }
    }
}
