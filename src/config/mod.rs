//! # Configuration
//!
//! Process configuration loaded from environment variables, optionally populated from a
//! `.env` file at startup.
//!
//! All configuration has sensible defaults and can be overridden via environment variables.

mod provisioning;
mod server;

pub use provisioning::ProvisioningConfig;
pub use server::ServerConfig;

use tracing::warn;

/// Load configuration from environment variables with defaults
pub fn load_config() -> (ProvisioningConfig, ServerConfig) {
    (ProvisioningConfig::from_env(), ServerConfig::from_env())
}

/// Read environment variable or return default value.
///
/// A value that does not parse is logged and replaced by the default.
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Ignoring invalid {}={:?}: {:?}", key, value, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Read an optional environment variable, treating empty values as unset
pub(crate) fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
