//! # Request Types
//!
//! Wire types accepted by the control surface and by `gwctl`.
//!
//! # Example
//!
//! ```json
//! {
//!   "stackName": "dev",
//!   "ApiName": "priceIntegration-dev",
//!   "description": "Api Gateway layer for price integration",
//!   "url": "https://dev-priceintegration.example.com",
//!   "deploymentName": "devDeployment-1",
//!   "stageName": "devv1",
//!   "domainName": "api.dev.example.com",
//!   "routes": [
//!     { "name": "/v1/healthcheck", "httpMethod": "GET" },
//!     { "name": "/v1/accountPricingArchitecture/{accountId}", "httpMethod": "PUT", "pathParams": ["accountId"] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single REST route to expose through the gateway
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Slash-delimited path template, may contain `{param}` placeholders
    #[serde(rename = "name", alias = "pathTemplate")]
    pub path: String,
    pub http_method: String,
    /// Path parameters. Only the first entry is wired into the method and integration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_params: Vec<String>,
    /// Optional JSON body schema, declared as an API Gateway model
    #[serde(
        default,
        alias = "requestSchema",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_model: Option<RequestSchema>,
}

impl RouteSpec {
    pub fn new(path: impl Into<String>, http_method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            http_method: http_method.into(),
            path_params: Vec::new(),
            request_model: None,
        }
    }

    #[must_use]
    pub fn with_path_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_params = params.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_request_model(mut self, schema: RequestSchema) -> Self {
        self.request_model = Some(schema);
        self
    }

    /// First path parameter, the only one API Gateway validation is wired for
    pub fn primary_path_param(&self) -> Option<&str> {
        self.path_params.first().map(String::as_str)
    }
}

/// Request body schema. Property definitions are passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default = "default_schema_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_schema_type() -> String {
    "object".to_string()
}

impl RequestSchema {
    /// Render as the draft-04 document stored on the API Gateway model
    pub fn to_json_schema(&self) -> Value {
        let mut document = Map::new();
        document.insert(
            "$schema".to_string(),
            Value::String(crate::constants::JSON_SCHEMA_DRAFT_04.to_string()),
        );
        if let Some(title) = &self.title {
            document.insert("title".to_string(), Value::String(title.clone()));
        }
        document.insert("type".to_string(), Value::String(self.schema_type.clone()));
        document.insert(
            "properties".to_string(),
            Value::Object(self.properties.clone()),
        );
        if let Some(required) = &self.required {
            document.insert(
                "required".to_string(),
                Value::Array(required.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(document)
    }
}

/// Body of `POST /api/createapigateway`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiGatewayRequest {
    #[serde(default)]
    pub stack_name: String,
    #[serde(rename = "ApiName", alias = "apiName", default)]
    pub api_name: String,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub description: String,
    /// Backend base URL. Each integration URI is this value followed by the route path.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub deployment_name: String,
    #[serde(default)]
    pub stage_name: String,
    /// Custom domain. Empty or absent skips the domain, mapping and DNS declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
}

impl CreateApiGatewayRequest {
    /// Domain name with empty strings treated as absent
    pub fn custom_domain(&self) -> Option<&str> {
        self.domain_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
