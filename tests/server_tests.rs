//! # Control Surface Tests
//!
//! Router tests driven through `tower::ServiceExt::oneshot`, using the plan engine and a
//! disabled stack CLI.

use apigateway_provisioner::constants::DEFAULT_REQUEST_BODY_LIMIT_BYTES;
use apigateway_provisioner::gateway::ApiGateway;
use apigateway_provisioner::server::backend::plan_path;
use apigateway_provisioner::server::{router, AppState, ProvisioningBackend};
use apigateway_provisioner::stack::{StackCli, StackRegistry};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::Ordering;
use tower::ServiceExt;

const FIXTURE: &str = include_str!("fixtures/price_integration.json");

fn app(plan_dir: &Path, stacks: StackRegistry) -> (Router, AppState) {
    let state = AppState::new(
        stacks,
        ApiGateway::default(),
        ProvisioningBackend::Plan {
            output_dir: plan_dir.to_path_buf(),
        },
        StackCli::disabled(),
    );
    (
        router(state.clone(), DEFAULT_REQUEST_BODY_LIMIT_BYTES),
        state,
    )
}

fn post(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/createapigateway")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn error_message(response: axum::response::Response) -> String {
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_api_gateway_success() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let response = app.oneshot(post(FIXTURE)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Stack created successfully!");
    assert!(state.stacks.contains("dev"));

    let plan: Value =
        serde_json::from_str(&std::fs::read_to_string(plan_path(dir.path(), "dev")).unwrap())
            .unwrap();
    assert_eq!(plan["report"]["methods_declared"], 8);
    assert_eq!(plan["declarations"][0]["kind"], "rest_api");
}

#[tokio::test]
async fn test_duplicate_stack_is_rejected_before_provisioning() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let first = app.clone().oneshot(post(FIXTURE)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Drop the first plan so a rewrite would be visible
    let plan = plan_path(dir.path(), "dev");
    std::fs::remove_file(&plan).unwrap();

    let second = app.oneshot(post(FIXTURE)).await.unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(second).await,
        "Stack name already exists: dev"
    );
    assert!(!plan.exists());
}

#[tokio::test]
async fn test_seeded_stack_is_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = app(dir.path(), StackRegistry::new(["dev"]));

    let response = app.oneshot(post(FIXTURE)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!plan_path(dir.path(), "dev").exists());
}

#[tokio::test]
async fn test_missing_stack_name() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let mut request: Value = serde_json::from_str(FIXTURE).unwrap();
    request["stackName"] = Value::String(String::new());

    let response = app
        .oneshot(post(serde_json::to_string(&request).unwrap()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Stack name is required!");
    assert!(state.stacks.names().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let response = app.oneshot(post("{\"stackName\": ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());
}

#[tokio::test]
async fn test_malformed_route_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let mut request: Value = serde_json::from_str(FIXTURE).unwrap();
    request["routes"][0]["name"] = Value::String("/".to_string());

    let response = app
        .oneshot(post(serde_json::to_string(&request).unwrap()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.starts_with("Malformed route '/'"));
    // Registration happens before provisioning and is kept
    assert!(state.stacks.contains("dev"));
    assert!(!plan_path(dir.path(), "dev").exists());
}

#[tokio::test]
async fn test_banner_and_health() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let banner = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(banner.status(), StatusCode::OK);

    let health = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_string(health).await, "OK");
}

#[tokio::test]
async fn test_readiness_follows_server_state() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let not_ready = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.server_state.is_ready.store(true, Ordering::Relaxed);
    let ready = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = app(dir.path(), StackRegistry::new(Vec::<String>::new()));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
