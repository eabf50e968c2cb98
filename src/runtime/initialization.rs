//! # Initialization
//!
//! Control surface initialization logic including rustls setup, `.env` loading,
//! tracing, metrics, backend selection and server startup.

use crate::config::{self, ServerConfig};
use crate::gateway::ApiGateway;
use crate::observability;
use crate::server::{start_server, AppState, ProvisioningBackend, ServerState};
use crate::stack::{StackCli, StackRegistry};
use anyhow::{Context, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Initialization result containing all necessary components for the control surface
#[derive(Debug)]
pub struct InitializationResult {
    pub state: AppState,
    pub server_config: ServerConfig,
    /// Background task running the HTTP server
    pub server_handle: tokio::task::JoinHandle<()>,
}

/// Initialize tracing with `RUST_LOG`, defaulting to `apigateway_provisioner=info`
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apigateway_provisioner=info".into()),
        )
        .try_init()
    {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Initialize the control surface runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - `.env` loading
/// - Tracing subscriber setup
/// - Metrics registration
/// - Stack registry seeding from the ledger
/// - Provisioning backend selection
/// - HTTP server startup
pub async fn initialize() -> Result<InitializationResult> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let dotenv_result = dotenvy::dotenv();

    init_tracing();

    match dotenv_result {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    info!(
        "Starting API Gateway provisioner v{}",
        env!("CARGO_PKG_VERSION")
    );

    observability::metrics::register_metrics()?;

    let (provisioning_config, server_config) = config::load_config();
    info!(
        "Configuration: engine={}, key_strategy={}, stack_cli={} (enabled: {})",
        provisioning_config.engine,
        provisioning_config.key_strategy,
        provisioning_config.stack_cli,
        provisioning_config.stack_cli_enabled
    );

    let stacks = StackRegistry::with_ledger(
        provisioning_config.seeded_stacks.clone(),
        provisioning_config.stack_ledger_path.clone(),
    )
    .context("Failed to load stack registry")?;
    info!("{} stack names already registered", stacks.names().len());

    let backend = ProvisioningBackend::from_config(&provisioning_config).await?;
    let stack_cli = StackCli::new(
        provisioning_config.stack_cli.clone(),
        provisioning_config.stack_cli_enabled,
        provisioning_config.stack_cli_workdir.clone(),
    );
    let gateway = ApiGateway::new(provisioning_config.gateway_settings());

    let state = AppState::new(stacks, gateway, backend, stack_cli);

    // Start server in background task
    let server_state = Arc::clone(&state.server_state);
    let server_task_state = state.clone();
    let port = server_config.port;
    let body_limit = server_config.request_body_limit_bytes;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, server_task_state, body_limit).await {
            error!("HTTP server error: {:#}", e);
        }
    });

    // Poll server startup - wait for it to be ready before proceeding
    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    Ok(InitializationResult {
        state,
        server_config,
        server_handle,
    })
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    server_config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(server_config.startup_timeout_secs);
    let poll_interval = Duration::from_millis(server_config.poll_interval_ms);
    let start_time = Instant::now();

    loop {
        // Check if server task crashed
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready.load(Ordering::Relaxed) {
            info!("HTTP server is ready and accepting connections");
            break;
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}
