//! # Constants
//!
//! Default values and fixed API Gateway literals shared across the provisioner.

/// Default HTTP port for the control surface
pub const DEFAULT_PORT: u16 = 3000;

/// Server startup timeout (seconds)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Server readiness poll interval (milliseconds)
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Maximum accepted request body (50 MiB)
pub const DEFAULT_REQUEST_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Default AWS region for the SDK engine
pub const DEFAULT_AWS_REGION: &str = "eu-west-1";

/// Directory where the plan engine writes one JSON plan per stack
pub const DEFAULT_PLAN_OUTPUT_DIR: &str = "plans";

/// Request validator declared once per REST API
pub const DEFAULT_REQUEST_VALIDATOR_NAME: &str = "RequestBodyAndParamsValidator";

/// Binary used for `stack init` / `up`
pub const DEFAULT_STACK_CLI: &str = "pulumi";

/// Ledger file listing every known stack name, one per line
pub const DEFAULT_STACK_LEDGER_PATH: &str = "output.txt";

/// Content type used for request models and method model references
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Built-in API Gateway model referenced when a method carries no body model
pub const EMPTY_MODEL_NAME: &str = "Empty";

/// JSON Schema dialect accepted by API Gateway models
pub const JSON_SCHEMA_DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

pub const MODEL_DESCRIPTION: &str = "A JSON Schema";

/// Authorization type for every declared method
pub const METHOD_AUTHORIZATION_NONE: &str = "NONE";

pub const INTEGRATION_TYPE_HTTP_PROXY: &str = "HTTP_PROXY";

/// Declaration names used by the finalize step
pub const DOMAIN_DECLARATION_NAME: &str = "DomainApiGateway";
pub const BASE_PATH_MAPPING_DECLARATION_NAME: &str = "basePathMapping";
pub const DNS_RECORD_DECLARATION_NAME: &str = "DomainAliasRecord";

/// Confirmation text returned by the control surface
pub const STACK_CREATED_MESSAGE: &str = "Stack created successfully!";

/// HTTP methods accepted in route specifications
pub const SUPPORTED_HTTP_METHODS: &[&str] =
    &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "ANY"];
