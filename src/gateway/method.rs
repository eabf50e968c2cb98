//! # Method Wiring
//!
//! Request model declaration and method + integration attachment for a resolved route.

use super::naming::{derive_model_name, integration_declaration_name, method_declaration_name};
use super::registry::{MethodDependencySet, RequestModelRegistry};
use super::GatewayContext;
use crate::constants::{
    EMPTY_MODEL_NAME, INTEGRATION_TYPE_HTTP_PROXY, JSON_CONTENT_TYPE, METHOD_AUTHORIZATION_NONE,
    MODEL_DESCRIPTION,
};
use crate::error::ProvisioningResult;
use crate::provider::{
    Handle, IntegrationDeclaration, MethodDeclaration, ModelDeclaration, ProvisioningEngine,
};
use crate::request::RouteSpec;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Method and integration declared for one route
#[derive(Debug, Clone)]
pub struct AttachedMethod {
    pub method: Handle,
    pub integration: Handle,
}

/// Declare the request model of `route` if it carries a schema.
///
/// The model is recorded under the terminal segment, replacing any model an earlier
/// route recorded there. A model name already declared in this run is recorded but
/// not declared again, and `None` is returned.
pub async fn declare_request_model(
    engine: &dyn ProvisioningEngine,
    ctx: &GatewayContext,
    terminal_segment: &str,
    route: &RouteSpec,
    models: &mut RequestModelRegistry,
) -> ProvisioningResult<Option<Handle>> {
    let Some(schema) = &route.request_model else {
        return Ok(None);
    };

    let name = derive_model_name(terminal_segment, &route.http_method)?;
    let handle = if models.is_declared(&name) {
        debug!(model.name = %name, route.path = %route.path, "Reusing declared model");
        None
    } else {
        let declaration = ModelDeclaration {
            name: name.clone(),
            description: MODEL_DESCRIPTION.to_string(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            schema: schema.to_json_schema(),
        };
        let handle = engine.declare_model(&ctx.api, &declaration).await?;
        models.mark_declared(&name);
        Some(handle)
    };

    if let Some(replaced) = models.record(terminal_segment, name.clone()) {
        if replaced != name {
            warn!(
                "Model {} replaces {} for terminal segment '{}'",
                name, replaced, terminal_segment
            );
        }
    }
    Ok(handle)
}

/// Declare the method and its HTTP proxy integration on `resource`.
///
/// `model_name` is the model registered for the route's terminal segment. GET methods
/// always reference the built-in empty model.
pub async fn attach_method_and_integration(
    engine: &dyn ProvisioningEngine,
    ctx: &GatewayContext,
    resource: &Handle,
    route: &RouteSpec,
    model_name: Option<&str>,
    methods: &mut MethodDependencySet,
) -> ProvisioningResult<AttachedMethod> {
    let http_method = route.http_method.as_str();

    let model = match http_method {
        "GET" => EMPTY_MODEL_NAME,
        _ => model_name.unwrap_or(EMPTY_MODEL_NAME),
    };
    let request_models = BTreeMap::from([(JSON_CONTENT_TYPE.to_string(), model.to_string())]);

    let request_validator_id =
        (http_method == "POST").then(|| ctx.request_validator.id.clone());

    let mut method_parameters = BTreeMap::new();
    let mut integration_parameters = BTreeMap::new();
    if let Some(param) = route.primary_path_param() {
        let method_param = format!("method.request.path.{param}");
        integration_parameters.insert(
            format!("integration.request.path.{param}"),
            method_param.clone(),
        );
        method_parameters.insert(method_param, true);
    }
    if route.path_params.len() > 1 {
        debug!(
            "Only the first of {} path parameters is wired for {}",
            route.path_params.len(),
            route.path
        );
    }

    let method_declaration = MethodDeclaration {
        name: method_declaration_name(&route.path, http_method),
        resource_id: resource.id.clone(),
        http_method: http_method.to_string(),
        authorization: METHOD_AUTHORIZATION_NONE.to_string(),
        request_parameters: method_parameters,
        request_validator_id,
        request_models,
    };
    let method = engine.declare_method(&ctx.api, &method_declaration).await?;

    let integration_declaration = IntegrationDeclaration {
        name: integration_declaration_name(http_method, &route.path),
        resource_id: resource.id.clone(),
        http_method: http_method.to_string(),
        integration_http_method: http_method.to_string(),
        integration_type: INTEGRATION_TYPE_HTTP_PROXY.to_string(),
        uri: format!("{}{}", ctx.url, route.path),
        request_parameters: integration_parameters,
    };
    let integration = engine
        .declare_integration(&ctx.api, &integration_declaration)
        .await?;

    methods.push(method.clone());
    Ok(AttachedMethod {
        method,
        integration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DeclarationKind, PlanRecorder, RestApiHandle};
    use crate::request::RequestSchema;
    use serde_json::json;

    fn context() -> GatewayContext {
        GatewayContext {
            api: RestApiHandle {
                handle: Handle::new(DeclarationKind::RestApi, "demo", "api-1"),
                root_resource_id: "api-1-root".to_string(),
            },
            request_validator: Handle::new(
                DeclarationKind::RequestValidator,
                "validator",
                "validator-2",
            ),
            url: "https://backend.example.com".to_string(),
            deployment_name: "dep".to_string(),
            stage_name: "v1".to_string(),
            domain: None,
        }
    }

    fn resource() -> Handle {
        Handle::new(DeclarationKind::Resource, "items", "res-3")
    }

    #[tokio::test]
    async fn test_get_always_uses_empty_model() {
        let recorder = PlanRecorder::new();
        let mut methods = MethodDependencySet::default();

        attach_method_and_integration(
            &recorder,
            &context(),
            &resource(),
            &RouteSpec::new("/items", "GET"),
            Some("itemsPOST"),
            &mut methods,
        )
        .await
        .unwrap();

        let method = &recorder.declarations_of(DeclarationKind::Method)[0];
        assert_eq!(method.name, "/itemsGET");
        assert_eq!(method.payload["request_models"]["application/json"], "Empty");
        assert!(method.payload["request_validator_id"].is_null());
        assert_eq!(methods.len(), 1);
    }

    #[tokio::test]
    async fn test_post_wires_validator_and_model() {
        let recorder = PlanRecorder::new();
        let mut methods = MethodDependencySet::default();

        attach_method_and_integration(
            &recorder,
            &context(),
            &resource(),
            &RouteSpec::new("/items", "POST"),
            Some("itemsPOST"),
            &mut methods,
        )
        .await
        .unwrap();

        let method = &recorder.declarations_of(DeclarationKind::Method)[0];
        assert_eq!(method.payload["request_models"]["application/json"], "itemsPOST");
        assert_eq!(method.payload["request_validator_id"], "validator-2");

        let integration = &recorder.declarations_of(DeclarationKind::Integration)[0];
        assert_eq!(integration.name, "POST/items");
        assert_eq!(
            integration.payload["uri"],
            "https://backend.example.com/items"
        );
        assert_eq!(integration.payload["integration_type"], "HTTP_PROXY");
    }

    #[tokio::test]
    async fn test_only_first_path_param_is_wired() {
        let recorder = PlanRecorder::new();
        let mut methods = MethodDependencySet::default();
        let route = RouteSpec::new("/items/{id}/{rev}", "DELETE").with_path_params(["id", "rev"]);

        attach_method_and_integration(
            &recorder,
            &context(),
            &resource(),
            &route,
            None,
            &mut methods,
        )
        .await
        .unwrap();

        let method = &recorder.declarations_of(DeclarationKind::Method)[0];
        assert_eq!(
            method.payload["request_parameters"],
            json!({ "method.request.path.id": true })
        );
        let integration = &recorder.declarations_of(DeclarationKind::Integration)[0];
        assert_eq!(
            integration.payload["request_parameters"],
            json!({ "integration.request.path.id": "method.request.path.id" })
        );
    }

    #[tokio::test]
    async fn test_model_is_declared_only_with_schema() {
        let recorder = PlanRecorder::new();
        let mut models = RequestModelRegistry::default();
        let ctx = context();

        let none = declare_request_model(
            &recorder,
            &ctx,
            "items",
            &RouteSpec::new("/items", "POST"),
            &mut models,
        )
        .await
        .unwrap();
        assert!(none.is_none());

        let schema: RequestSchema =
            serde_json::from_value(json!({ "title": "Item", "properties": {} })).unwrap();
        let route = RouteSpec::new("/items", "POST").with_request_model(schema);
        let handle = declare_request_model(&recorder, &ctx, "items", &route, &mut models)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(handle.name, "itemsPOST");
        assert_eq!(models.get("items"), Some("itemsPOST"));
        let model = &recorder.declarations_of(DeclarationKind::Model)[0];
        assert_eq!(model.payload["description"], "A JSON Schema");
        assert_eq!(model.payload["content_type"], "application/json");
    }

    #[tokio::test]
    async fn test_model_name_is_declared_once_per_run() {
        let recorder = PlanRecorder::new();
        let mut models = RequestModelRegistry::default();
        let ctx = context();
        let schema: RequestSchema =
            serde_json::from_value(json!({ "title": "Id", "properties": {} })).unwrap();

        let first = declare_request_model(
            &recorder,
            &ctx,
            "{id}",
            &RouteSpec::new("/a/{id}", "POST").with_request_model(schema.clone()),
            &mut models,
        )
        .await
        .unwrap();
        let second = declare_request_model(
            &recorder,
            &ctx,
            "{id}",
            &RouteSpec::new("/b/{id}", "POST").with_request_model(schema),
            &mut models,
        )
        .await
        .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(recorder.declarations_of(DeclarationKind::Model).len(), 1);
        assert_eq!(models.get("{id}"), Some("idPOST"));
    }
}
