//! # HTTP Control Surface
//!
//! Axum server exposing provisioning, probes and metrics on one port.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | banner |
//! | `POST /api/createapigateway` | register a stack and provision its API Gateway |
//! | `GET /healthz` | liveness |
//! | `GET /readyz` | readiness, true once the listener is bound |
//! | `GET /metrics` | Prometheus metrics |

pub mod backend;
pub mod handlers;

pub use backend::ProvisioningBackend;

use crate::gateway::ApiGateway;
use crate::stack::{StackCli, StackRegistry};
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server state for health checks
#[derive(Debug, Default)]
pub struct ServerState {
    pub is_ready: Arc<AtomicBool>,
}

/// Shared state of every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub stacks: Arc<StackRegistry>,
    pub gateway: ApiGateway,
    pub backend: Arc<ProvisioningBackend>,
    pub stack_cli: StackCli,
    pub server_state: Arc<ServerState>,
}

impl AppState {
    pub fn new(
        stacks: StackRegistry,
        gateway: ApiGateway,
        backend: ProvisioningBackend,
        stack_cli: StackCli,
    ) -> Self {
        Self {
            stacks: Arc::new(stacks),
            gateway,
            backend: Arc::new(backend),
            stack_cli,
            server_state: Arc::new(ServerState::default()),
        }
    }
}

/// Build the router
pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::banner))
        .route("/api/createapigateway", post(handlers::create_api_gateway))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
        .with_state(state)
}

/// Bind `port`, mark the server ready and serve until the listener fails
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn start_server(port: u16, state: AppState, body_limit_bytes: usize) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind control surface to {addr}"))?;

    let server_state = Arc::clone(&state.server_state);
    let app = router(state, body_limit_bytes);

    info!("Control surface listening on {}", addr);
    server_state.is_ready.store(true, Ordering::Relaxed);

    axum::serve(listener, app)
        .await
        .context("Control surface stopped unexpectedly")
}
