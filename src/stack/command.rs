//! # Stack CLI
//!
//! Runs `<cli> stack init <name>` and `<cli> up --skip-preview`. Output is logged and
//! failures never propagate: callers get an acknowledgement flag that is true only when
//! the command exited successfully and printed something.

use crate::observability::metrics;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Infrastructure CLI invoker
#[derive(Debug, Clone)]
pub struct StackCli {
    program: String,
    enabled: bool,
    workdir: Option<PathBuf>,
}

impl StackCli {
    pub fn new(program: impl Into<String>, enabled: bool, workdir: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            enabled,
            workdir,
        }
    }

    /// Invoker that never runs anything
    pub fn disabled() -> Self {
        Self::new(crate::constants::DEFAULT_STACK_CLI, false, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `<cli> stack init <name>`
    pub async fn init_stack(&self, stack_name: &str) -> bool {
        self.invoke("stack_init", &["stack", "init", stack_name])
            .await
    }

    /// `<cli> up --skip-preview`
    pub async fn apply(&self) -> bool {
        self.invoke("up", &["up", "--skip-preview"]).await
    }

    async fn invoke(&self, label: &'static str, args: &[&str]) -> bool {
        if !self.enabled {
            debug!("Stack CLI disabled, skipping {} {}", self.program, args.join(" "));
            metrics::increment_stack_cli_invocations(label, "disabled");
            return false;
        }

        let program = match which::which(&self.program) {
            Ok(path) => path,
            Err(e) => {
                warn!(
                    "Stack CLI '{}' not found on PATH, skipping {}: {}",
                    self.program,
                    args.join(" "),
                    e
                );
                metrics::increment_stack_cli_invocations(label, "missing_binary");
                return false;
            }
        };

        match self.execute(&program, args).await {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stdout.trim().is_empty() {
                    info!("{} {} stdout:\n{}", self.program, args.join(" "), stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    warn!("{} {} stderr:\n{}", self.program, args.join(" "), stderr.trim_end());
                }

                let acknowledged = output.status.success() && !stdout.trim().is_empty();
                if !output.status.success() {
                    error!(
                        "{} {} exited with {}",
                        self.program,
                        args.join(" "),
                        output.status
                    );
                }
                metrics::increment_stack_cli_invocations(
                    label,
                    if acknowledged { "acknowledged" } else { "failed" },
                );
                acknowledged
            }
            Err(e) => {
                error!("{:#}", e);
                metrics::increment_stack_cli_invocations(label, "failed");
                false
            }
        }
    }

    async fn execute(&self, program: &std::path::Path, args: &[&str]) -> Result<Output> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        info!("Running {} {}", self.program, args.join(" "));
        command
            .output()
            .await
            .with_context(|| format!("Failed to execute {} {}", self.program, args.join(" ")))
    }
}
