//! # Provisioning Error Types
//!
//! Defines error types for a provisioning run with classification of caller errors
//! (rejected before anything is declared) versus engine failures (abort mid-run).

use thiserror::Error;

/// Error raised while validating or provisioning an API Gateway
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Request carried no stack name
    #[error("Stack name is required!")]
    MissingStackName,

    /// Stack name was already registered in this process (or its ledger)
    #[error("Stack name already exists: {0}")]
    DuplicateStack(String),

    /// Route specification cannot be turned into a resource chain
    #[error("Malformed route '{path}': {reason}")]
    MalformedRoute { path: String, reason: String },

    /// Sanitizing the model name removed every character
    #[error("Cannot derive a model name from '{0}': no ASCII letters or digits")]
    EmptyModelName(String),

    /// Request-level validation failure (URL, names, domain settings)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A declare-* call against the provisioning engine failed
    #[error("{operation} failed for '{name}': {message}")]
    Engine {
        operation: &'static str,
        name: String,
        message: String,
    },
}

impl ProvisioningError {
    pub fn malformed_route(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRoute {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn engine(operation: &'static str, name: &str, message: impl Into<String>) -> Self {
        Self::Engine {
            operation,
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Errors the caller can fix by changing the request.
    /// These are always raised before the first declaration.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ProvisioningError::Engine { .. })
    }

    /// Get human-readable reason string for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningError::MissingStackName => "missing_stack_name",
            ProvisioningError::DuplicateStack(_) => "duplicate_stack",
            ProvisioningError::MalformedRoute { .. } => "malformed_route",
            ProvisioningError::EmptyModelName(_) => "empty_model_name",
            ProvisioningError::InvalidRequest(_) => "invalid_request",
            ProvisioningError::Engine { .. } => "engine_failure",
        }
    }
}

pub type ProvisioningResult<T> = std::result::Result<T, ProvisioningError>;
