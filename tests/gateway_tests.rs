//! # Gateway Provisioning Tests
//!
//! End-to-end provisioning runs against the plan engine.
//!
//! These tests verify:
//! - Resource tree deduplication and parent-qualified naming
//! - Method, integration and model wiring
//! - Determinism across fresh sessions
//! - Validation before the first declaration
//! - Custom domain finalization

use apigateway_provisioner::gateway::{
    ApiGateway, DomainSettings, GatewaySettings, ResourceKeyStrategy,
};
use apigateway_provisioner::provider::plan::PlannedDeclaration;
use apigateway_provisioner::provider::{DeclarationKind, PlanRecorder};
use apigateway_provisioner::request::{CreateApiGatewayRequest, RequestSchema, RouteSpec};
use apigateway_provisioner::ProvisioningError;
use serde_json::json;

fn fixture() -> CreateApiGatewayRequest {
    serde_json::from_str(include_str!("fixtures/price_integration.json"))
        .expect("fixture should parse")
}

fn request(routes: Vec<RouteSpec>) -> CreateApiGatewayRequest {
    CreateApiGatewayRequest {
        stack_name: "dev".to_string(),
        api_name: "priceIntegration-dev".to_string(),
        routes,
        description: "price integration".to_string(),
        url: "https://dev-priceintegration.example.com".to_string(),
        deployment_name: "devDeployment-1".to_string(),
        stage_name: "devv1".to_string(),
        domain_name: None,
    }
}

fn schema() -> RequestSchema {
    serde_json::from_value(json!({
        "title": "Default Values model",
        "type": "object",
        "properties": { "accountId": { "type": "string" } },
        "required": ["accountId"]
    }))
    .unwrap()
}

fn find<'a>(declarations: &'a [PlannedDeclaration], name: &str) -> &'a PlannedDeclaration {
    declarations
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| panic!("no declaration named {name}"))
}

#[tokio::test]
async fn test_shared_resources_are_declared_once() {
    let recorder = PlanRecorder::new();
    let req = request(vec![
        RouteSpec::new("/v1/healthcheck", "GET"),
        RouteSpec::new("/v1/defaultValues", "POST").with_request_model(schema()),
        RouteSpec::new("/v1/defaultValues", "GET"),
    ]);

    let report = ApiGateway::default().provision(&recorder, &req).await.unwrap();

    let resources = recorder.declarations_of(DeclarationKind::Resource);
    let names: Vec<&str> = resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["v1", "healthcheck", "defaultValues"]);
    assert_eq!(report.resources_declared, 3);

    let models = recorder.declarations_of(DeclarationKind::Model);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "defaultValuesPOST");
    assert_eq!(
        models[0].payload["schema"]["$schema"],
        "http://json-schema.org/draft-04/schema#"
    );

    let default_values = &resources[2];
    let methods = recorder.declarations_of(DeclarationKind::Method);
    let on_default_values: Vec<&PlannedDeclaration> = methods
        .iter()
        .filter(|m| m.payload["resource_id"] == default_values.id.as_str())
        .collect();
    assert_eq!(on_default_values.len(), 2);

    let post = find(&methods, "/v1/defaultValuesPOST");
    assert_eq!(
        post.payload["request_models"]["application/json"],
        "defaultValuesPOST"
    );
    let get = find(&methods, "/v1/defaultValuesGET");
    assert_eq!(get.payload["request_models"]["application/json"], "Empty");
}

#[tokio::test]
async fn test_path_parameter_wiring() {
    let recorder = PlanRecorder::new();
    let req = request(vec![RouteSpec::new(
        "/v1/accountPricingArchitecture/{accountId}",
        "PUT",
    )
    .with_path_params(["accountId"])]);

    ApiGateway::default().provision(&recorder, &req).await.unwrap();

    let methods = recorder.declarations_of(DeclarationKind::Method);
    let method = find(&methods, "/v1/accountPricingArchitecture/{accountId}PUT");
    assert_eq!(
        method.payload["request_parameters"],
        json!({ "method.request.path.accountId": true })
    );
    assert!(method.payload["request_validator_id"].is_null());

    let integrations = recorder.declarations_of(DeclarationKind::Integration);
    let integration = find(&integrations, "PUT/v1/accountPricingArchitecture/{accountId}");
    assert_eq!(
        integration.payload["request_parameters"],
        json!({ "integration.request.path.accountId": "method.request.path.accountId" })
    );
    assert_eq!(
        integration.payload["uri"],
        "https://dev-priceintegration.example.com/v1/accountPricingArchitecture/{accountId}"
    );
    assert_eq!(integration.payload["integration_http_method"], "PUT");
}

#[tokio::test]
async fn test_recurring_placeholder_gets_parent_qualified_name() {
    let recorder = PlanRecorder::new();
    ApiGateway::default()
        .provision(&recorder, &fixture())
        .await
        .unwrap();

    let resources = recorder.declarations_of(DeclarationKind::Resource);
    let required_inputs = find(&resources, "requiredInputs");
    let sku_resources: Vec<&PlannedDeclaration> = resources
        .iter()
        .filter(|r| r.payload["path_part"] == "{sku}")
        .collect();

    assert_eq!(sku_resources.len(), 2);
    assert_eq!(sku_resources[0].name, "{sku}");
    assert_eq!(
        sku_resources[1].name,
        format!("{{sku}}{}", required_inputs.id)
    );
    assert_eq!(sku_resources[1].payload["parent_id"], required_inputs.id.as_str());
}

#[tokio::test]
async fn test_fixture_counts() {
    let recorder = PlanRecorder::new();
    let report = ApiGateway::default()
        .provision(&recorder, &fixture())
        .await
        .unwrap();

    assert_eq!(report.resources_declared, 9);
    assert_eq!(report.models_declared, 2);
    assert_eq!(report.methods_declared, 8);
    assert_eq!(recorder.count(DeclarationKind::Integration), 8);
    assert_eq!(recorder.count(DeclarationKind::RequestValidator), 1);
    assert_eq!(recorder.count(DeclarationKind::Deployment), 1);
    assert_eq!(recorder.count(DeclarationKind::Stage), 1);
    assert_eq!(report.api_id, "api-1");
    assert_eq!(report.root_resource_id, "api-1-root");
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let gateway = ApiGateway::default();
    let first = gateway.plan(&fixture()).await.unwrap();
    let second = gateway.plan(&fixture()).await.unwrap();

    assert_eq!(first.report.resource_keys, second.report.resource_keys);
    assert_eq!(first.declarations, second.declarations);
    assert_ne!(first.report.run_id, second.report.run_id);
}

#[tokio::test]
async fn test_validator_is_wired_for_every_post() {
    let recorder = PlanRecorder::new();
    ApiGateway::default()
        .provision(&recorder, &fixture())
        .await
        .unwrap();

    let validator = &recorder.declarations_of(DeclarationKind::RequestValidator)[0];
    assert_eq!(validator.name, "RequestBodyAndParamsValidator");

    for method in recorder.declarations_of(DeclarationKind::Method) {
        let is_post = method.payload["http_method"] == "POST";
        assert_eq!(
            method.payload["request_validator_id"] == validator.id.as_str(),
            is_post,
            "method {}",
            method.name
        );
    }
}

#[tokio::test]
async fn test_deployment_waits_for_every_method() {
    let recorder = PlanRecorder::new();
    ApiGateway::default()
        .provision(&recorder, &fixture())
        .await
        .unwrap();

    let declarations = recorder.declarations();
    let deployment = &recorder.declarations_of(DeclarationKind::Deployment)[0];
    let last_method = recorder
        .declarations_of(DeclarationKind::Method)
        .last()
        .map(|m| m.sequence)
        .unwrap();

    assert!(deployment.sequence > last_method);
    assert_eq!(deployment.payload["depends_on"].as_array().unwrap().len(), 8);
    assert_eq!(declarations.last().unwrap().kind, DeclarationKind::Stage);
}

#[tokio::test]
async fn test_concatenated_keys_merge_shifted_boundaries() {
    let routes = vec![
        RouteSpec::new("/ab/c", "GET"),
        RouteSpec::new("/a/bc", "POST"),
    ];

    let concatenated = PlanRecorder::new();
    ApiGateway::default()
        .provision(&concatenated, &request(routes.clone()))
        .await
        .unwrap();
    // `a` is new, `bc` resolves to the key of `ab/c`
    assert_eq!(concatenated.count(DeclarationKind::Resource), 3);

    let delimited = PlanRecorder::new();
    let gateway = ApiGateway::new(GatewaySettings {
        key_strategy: ResourceKeyStrategy::Delimited,
        ..GatewaySettings::default()
    });
    let report = gateway.provision(&delimited, &request(routes)).await.unwrap();
    assert_eq!(delimited.count(DeclarationKind::Resource), 4);
    assert_eq!(
        report
            .resource_keys
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>(),
        vec!["ab", "ab/c", "a", "a/bc"]
    );
}

#[tokio::test]
async fn test_request_model_registry_last_writer_wins() {
    let recorder = PlanRecorder::new();
    let req = request(vec![
        RouteSpec::new("/a/items", "POST").with_request_model(schema()),
        RouteSpec::new("/b/items", "PUT").with_request_model(schema()),
        RouteSpec::new("/a/items", "PATCH"),
    ]);

    ApiGateway::default().provision(&recorder, &req).await.unwrap();

    let methods = recorder.declarations_of(DeclarationKind::Method);
    let patch = find(&methods, "/a/itemsPATCH");
    assert_eq!(patch.payload["request_models"]["application/json"], "itemsPUT");
}

#[tokio::test]
async fn test_shared_model_name_is_declared_once() {
    let recorder = PlanRecorder::new();
    let req = request(vec![
        RouteSpec::new("/a/{id}", "POST").with_request_model(schema()),
        RouteSpec::new("/b/{id}", "POST").with_request_model(schema()),
    ]);

    let report = ApiGateway::default().provision(&recorder, &req).await.unwrap();

    let models = recorder.declarations_of(DeclarationKind::Model);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "idPOST");
    assert_eq!(report.models_declared, 1);

    let methods = recorder.declarations_of(DeclarationKind::Method);
    assert_eq!(methods.len(), 2);
    for method in &methods {
        assert_eq!(method.payload["request_models"]["application/json"], "idPOST");
    }
}

#[tokio::test]
async fn test_invalid_request_declares_nothing() {
    let recorder = PlanRecorder::new();
    let req = request(vec![
        RouteSpec::new("/v1/healthcheck", "GET"),
        RouteSpec::new("/v1/items", "FETCH"),
    ]);

    let err = ApiGateway::default()
        .provision(&recorder, &req)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisioningError::MalformedRoute { .. }));
    assert!(recorder.declarations().is_empty());
}

#[tokio::test]
async fn test_missing_stack_name_declares_nothing() {
    let recorder = PlanRecorder::new();
    let mut req = request(vec![RouteSpec::new("/v1/healthcheck", "GET")]);
    req.stack_name = String::new();

    let err = ApiGateway::default()
        .provision(&recorder, &req)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Stack name is required!");
    assert!(recorder.declarations().is_empty());
}

#[tokio::test]
async fn test_engine_failure_keeps_earlier_declarations() {
    let recorder =
        PlanRecorder::new().with_failure(DeclarationKind::Method, "/v1/defaultValuesGET");

    let err = ApiGateway::default()
        .provision(&recorder, &fixture())
        .await
        .unwrap_err();

    assert!(!err.is_client_error());
    assert!(recorder.count(DeclarationKind::Method) > 0);
    assert_eq!(recorder.count(DeclarationKind::Deployment), 0);
}

#[tokio::test]
async fn test_custom_domain_requires_settings() {
    let recorder = PlanRecorder::new();
    let mut req = fixture();
    req.domain_name = Some("api.dev.example.com".to_string());

    let err = ApiGateway::default()
        .provision(&recorder, &req)
        .await
        .unwrap_err();

    assert_eq!(err.as_str(), "invalid_request");
    assert!(recorder.declarations().is_empty());
}

#[tokio::test]
async fn test_custom_domain_is_finalized() {
    let recorder = PlanRecorder::new();
    let mut req = fixture();
    req.domain_name = Some("api.dev.example.com".to_string());
    let gateway = ApiGateway::new(GatewaySettings {
        domain: DomainSettings {
            certificate_arn: Some(
                "arn:aws:acm:eu-west-1:123456789012:certificate/abc".to_string(),
            ),
            hosted_zone_id: Some("Z0123456789".to_string()),
        },
        ..GatewaySettings::default()
    });

    let report = gateway.provision(&recorder, &req).await.unwrap();

    assert_eq!(report.custom_domain.as_deref(), Some("api.dev.example.com"));
    let domain = &recorder.declarations_of(DeclarationKind::DomainName)[0];
    assert_eq!(domain.name, "DomainApiGateway");
    assert_eq!(
        domain.payload["regional_certificate_arn"],
        "arn:aws:acm:eu-west-1:123456789012:certificate/abc"
    );
    let record = &recorder.declarations_of(DeclarationKind::DnsRecord)[0];
    assert_eq!(record.payload["record_name"], "api.dev.example.com");
    assert_eq!(record.payload["alias_zone_id"], "PLANZONE");
    assert_eq!(
        recorder.declarations().last().unwrap().kind,
        DeclarationKind::DnsRecord
    );
}
