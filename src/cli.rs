//! # GWCTL CLI
//!
//! Command-line interface for the API Gateway provisioner.
//!
//! ## Usage
//!
//! ```bash
//! # Resolve a request offline and print the declaration plan
//! gwctl plan --request request.json
//!
//! # Same, as YAML, with delimited resource keys
//! gwctl plan --request request.yaml --format yaml --key-strategy delimited
//!
//! # Submit a request to a running control surface
//! gwctl submit --request request.json --server http://localhost:3000
//! ```

use anyhow::{Context, Result};
use apigateway_provisioner::gateway::{
    ApiGateway, DomainSettings, GatewaySettings, PlanDocument, ResourceKeyStrategy,
};
use apigateway_provisioner::request::CreateApiGatewayRequest;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// API Gateway provisioner CLI
#[derive(Parser)]
#[command(name = "gwctl")]
#[command(about = "API Gateway provisioner CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request against the plan engine and print what would be declared
    Plan {
        /// Request file (.json, .yaml or .yml)
        #[arg(short, long)]
        request: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// How resource keys are derived from path segments
        #[arg(long, default_value = "concatenated")]
        key_strategy: ResourceKeyStrategy,

        /// Request validator name
        #[arg(long, default_value = apigateway_provisioner::constants::DEFAULT_REQUEST_VALIDATOR_NAME)]
        validator_name: String,

        /// Regional certificate ARN, required when the request names a custom domain
        #[arg(long, env = "DOMAIN_CERTIFICATE_ARN")]
        certificate_arn: Option<String>,

        /// Route 53 hosted zone, required when the request names a custom domain
        #[arg(long, env = "DOMAIN_HOSTED_ZONE_ID")]
        hosted_zone_id: Option<String>,
    },
    /// Post a request to a running control surface
    Submit {
        /// Request file (.json, .yaml or .yml)
        #[arg(short, long)]
        request: PathBuf,

        /// Control surface base URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        server: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apigateway_provisioner=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            request,
            format,
            key_strategy,
            validator_name,
            certificate_arn,
            hosted_zone_id,
        } => {
            let settings = GatewaySettings {
                request_validator_name: validator_name,
                key_strategy,
                domain: DomainSettings {
                    certificate_arn,
                    hosted_zone_id,
                },
            };
            plan_command(&request, format, settings).await
        }
        Commands::Submit { request, server } => submit_command(&request, &server).await,
    }
}

/// Read a request file, choosing the parser by extension
fn load_request(path: &Path) -> Result<CreateApiGatewayRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML request {}", path.display()))
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON request {}", path.display()))
    }
}

async fn plan_command(path: &Path, format: OutputFormat, settings: GatewaySettings) -> Result<()> {
    let request = load_request(path)?;
    let gateway = ApiGateway::new(settings);
    let document = gateway
        .plan(&request)
        .await
        .context("Provisioning plan failed")?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&document).context("Failed to render plan")?
            );
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yaml::to_string(&document).context("Failed to render plan")?
            );
        }
        OutputFormat::Summary => print_summary(&document),
    }

    Ok(())
}

fn print_summary(document: &PlanDocument) {
    let report = &document.report;
    println!("Plan for stack '{}' (API '{}'):\n", report.stack_name, report.api_name);
    println!("  Key strategy: {}", report.key_strategy);
    println!("  Resources:    {}", report.resources_declared);
    println!("  Models:       {}", report.models_declared);
    println!("  Methods:      {}", report.methods_declared);
    println!("  Stage:        {}", report.stage_name);
    if let Some(domain) = &report.custom_domain {
        println!("  Domain:       {domain}");
    }

    println!("\n{:<5} {:<20} {:<45} {:<15}", "SEQ", "KIND", "NAME", "ID");
    println!("{}", "-".repeat(88));
    for declaration in &document.declarations {
        println!(
            "{:<5} {:<20} {:<45} {:<15}",
            declaration.sequence, declaration.kind, declaration.name, declaration.id
        );
    }
}

async fn submit_command(path: &Path, server: &str) -> Result<()> {
    let request = load_request(path)?;
    let url = format!("{}/api/createapigateway", server.trim_end_matches('/'));

    println!("Submitting stack '{}' to {}...", request.stack_name, url);

    let response = reqwest::Client::new()
        .post(&url)
        .json(&request)
        .send()
        .await
        .with_context(|| format!("Failed to reach control surface at {url}"))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read control surface response")?;

    if status.is_success() {
        println!("✅ {body}");
        Ok(())
    } else {
        Err(anyhow::anyhow!("Control surface returned {status}: {body}"))
    }
}
