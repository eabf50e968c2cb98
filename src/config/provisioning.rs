//! # Provisioning Configuration
//!
//! Engine selection, gateway naming settings, custom domain settings and stack CLI
//! settings.

use super::{env_var_opt, env_var_or_default};
use crate::gateway::{DomainSettings, GatewaySettings, ResourceKeyStrategy};
use crate::provider::EngineKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// `PROVISIONING_ENGINE`: `plan` or `aws`
    pub engine: EngineKind,
    pub aws_region: String,
    /// `AWS_ENDPOINT_URL`: route SDK calls to a local mock
    pub aws_endpoint_url: Option<String>,
    /// Where the plan engine writes `<stack>.json`
    pub plan_output_dir: PathBuf,
    pub request_validator_name: String,
    pub key_strategy: ResourceKeyStrategy,
    /// Regional ACM certificate for custom domains
    pub domain_certificate_arn: Option<String>,
    /// Route 53 hosted zone receiving the alias record
    pub domain_hosted_zone_id: Option<String>,
    pub stack_cli: String,
    pub stack_cli_enabled: bool,
    pub stack_cli_workdir: Option<PathBuf>,
    pub stack_ledger_path: PathBuf,
    /// Names treated as already taken at startup
    pub seeded_stacks: Vec<String>,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            engine: EngineKind::default(),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            aws_endpoint_url: None,
            plan_output_dir: PathBuf::from(DEFAULT_PLAN_OUTPUT_DIR),
            request_validator_name: DEFAULT_REQUEST_VALIDATOR_NAME.to_string(),
            key_strategy: ResourceKeyStrategy::default(),
            domain_certificate_arn: None,
            domain_hosted_zone_id: None,
            stack_cli: DEFAULT_STACK_CLI.to_string(),
            stack_cli_enabled: true,
            stack_cli_workdir: None,
            stack_ledger_path: PathBuf::from(DEFAULT_STACK_LEDGER_PATH),
            seeded_stacks: Vec::new(),
        }
    }
}

impl ProvisioningConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            engine: env_var_or_default("PROVISIONING_ENGINE", EngineKind::default()),
            aws_region: env_var_or_default("AWS_REGION", DEFAULT_AWS_REGION.to_string()),
            aws_endpoint_url: env_var_opt("AWS_ENDPOINT_URL"),
            plan_output_dir: env_var_opt("PLAN_OUTPUT_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_PLAN_OUTPUT_DIR), PathBuf::from),
            request_validator_name: env_var_or_default(
                "REQUEST_VALIDATOR_NAME",
                DEFAULT_REQUEST_VALIDATOR_NAME.to_string(),
            ),
            key_strategy: env_var_or_default(
                "RESOURCE_KEY_STRATEGY",
                ResourceKeyStrategy::default(),
            ),
            domain_certificate_arn: env_var_opt("DOMAIN_CERTIFICATE_ARN"),
            domain_hosted_zone_id: env_var_opt("DOMAIN_HOSTED_ZONE_ID"),
            stack_cli: env_var_or_default("STACK_CLI", DEFAULT_STACK_CLI.to_string()),
            stack_cli_enabled: env_var_or_default("STACK_CLI_ENABLED", true),
            stack_cli_workdir: env_var_opt("STACK_CLI_WORKDIR").map(PathBuf::from),
            stack_ledger_path: env_var_opt("STACK_LEDGER_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_STACK_LEDGER_PATH), PathBuf::from),
            seeded_stacks: env_var_opt("SEEDED_STACKS")
                .map(|v| parse_stack_list(&v))
                .unwrap_or_default(),
        }
    }

    /// Settings handed to every provisioning run
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            request_validator_name: self.request_validator_name.clone(),
            key_strategy: self.key_strategy,
            domain: DomainSettings {
                certificate_arn: self.domain_certificate_arn.clone(),
                hosted_zone_id: self.domain_hosted_zone_id.clone(),
            },
        }
    }
}

/// Comma separated stack names, blanks dropped
fn parse_stack_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
