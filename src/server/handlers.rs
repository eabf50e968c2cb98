//! # Handlers
//!
//! Request handlers for the control surface.

use super::AppState;
use crate::constants::STACK_CREATED_MESSAGE;
use crate::error::ProvisioningError;
use crate::observability::metrics;
use crate::request::CreateApiGatewayRequest;
use crate::validation::validate_stack_name;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};

/// `{"error": "<message>"}` with status 400
pub fn error_response(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
        .into_response()
}

fn provisioning_error_response(err: &ProvisioningError) -> Response {
    if err.is_client_error() {
        warn!("Rejected request: {}", err);
    } else {
        error!("Provisioning failed: {}", err);
    }
    error_response(err.to_string())
}

/// `GET /`
pub async fn banner() -> &'static str {
    "API Gateway provisioner is running. POST /api/createapigateway to provision a stack."
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "OK"
}

/// `GET /readyz`
pub async fn readyz(State(state): State<AppState>) -> Response {
    if state.server_state.is_ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "Ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready").into_response()
    }
}

/// `GET /metrics`
pub async fn metrics_handler() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// `POST /api/createapigateway`
///
/// 1. Reject a missing, invalid or already known stack name.
/// 2. `stack init <name>`.
/// 3. Provision through the configured engine.
/// 4. `up --skip-preview`.
///
/// Every failure, malformed JSON included, is a 400 with an `error` field.
pub async fn create_api_gateway(
    State(state): State<AppState>,
    payload: Result<Json<CreateApiGatewayRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            metrics::increment_provisioning_runs("invalid_body");
            return error_response(rejection.body_text());
        }
    };

    if let Err(e) = validate_stack_name(&request.stack_name) {
        metrics::increment_provisioning_runs(e.as_str());
        return provisioning_error_response(&e);
    }
    if let Err(e) = state.stacks.register(&request.stack_name) {
        metrics::increment_provisioning_runs(e.as_str());
        return provisioning_error_response(&e);
    }

    let initialized = state.stack_cli.init_stack(&request.stack_name).await;
    info!(
        "Stack init for {} acknowledged: {}",
        request.stack_name, initialized
    );

    match state.backend.provision(&state.gateway, &request).await {
        Ok(report) => {
            info!(
                "Stack {} provisioned: API {} with {} methods on stage {}",
                report.stack_name, report.api_id, report.methods_declared, report.stage_name
            );
            let applied = state.stack_cli.apply().await;
            info!("Stack up for {} acknowledged: {}", request.stack_name, applied);
            (StatusCode::OK, STACK_CREATED_MESSAGE).into_response()
        }
        Err(e) => provisioning_error_response(&e),
    }
}
