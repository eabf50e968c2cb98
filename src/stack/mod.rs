//! # Stack Management
//!
//! Stack-name uniqueness for the control surface and invocation of the infrastructure
//! CLI that owns the stacks.
//!
//! A stack name is registered once per process. Registration survives a failed
//! provisioning run, so a name that failed half-way cannot be submitted again without a
//! restart. Every registration rewrites the ledger file with the full list of known
//! names, and the next start seeds the registry from it.

pub mod command;

pub use command::StackCli;

use crate::error::{ProvisioningError, ProvisioningResult};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Process-wide set of known stack names
#[derive(Debug)]
pub struct StackRegistry {
    names: Mutex<BTreeSet<String>>,
    ledger_path: Option<PathBuf>,
}

impl StackRegistry {
    /// Registry seeded with `seeds` and without a ledger
    pub fn new<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Mutex::new(seeds.into_iter().map(Into::into).collect()),
            ledger_path: None,
        }
    }

    /// Registry seeded with `seeds` and every name listed in the ledger file.
    ///
    /// A missing ledger is treated as empty and created on the first registration.
    pub fn with_ledger<I, S>(seeds: I, ledger_path: impl Into<PathBuf>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ledger_path = ledger_path.into();
        let mut names: BTreeSet<String> = seeds.into_iter().map(Into::into).collect();

        if ledger_path.exists() {
            let contents = std::fs::read_to_string(&ledger_path).with_context(|| {
                format!("Failed to read stack ledger {}", ledger_path.display())
            })?;
            let before = names.len();
            names.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
            );
            info!(
                "Loaded {} stack names from ledger {}",
                names.len() - before,
                ledger_path.display()
            );
        } else {
            debug!("Stack ledger {} does not exist yet", ledger_path.display());
        }

        Ok(Self {
            names: Mutex::new(names),
            ledger_path: Some(ledger_path),
        })
    }

    /// Register `stack_name`, failing if it is already known.
    ///
    /// The check and the insert happen under one lock, so two concurrent requests for
    /// the same name cannot both succeed.
    pub fn register(&self, stack_name: &str) -> ProvisioningResult<()> {
        if stack_name.trim().is_empty() {
            return Err(ProvisioningError::MissingStackName);
        }

        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if names.contains(stack_name) {
            return Err(ProvisioningError::DuplicateStack(stack_name.to_string()));
        }
        names.insert(stack_name.to_string());
        info!("Registered stack {}", stack_name);

        if let Some(path) = &self.ledger_path {
            // Ledger failures do not fail the registration
            if let Err(e) = write_ledger(path, &names) {
                warn!("{:#}", e);
            }
        }
        Ok(())
    }

    pub fn contains(&self, stack_name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(stack_name)
    }

    /// Known stack names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn ledger_path(&self) -> Option<&Path> {
        self.ledger_path.as_deref()
    }
}

fn write_ledger(path: &Path, names: &BTreeSet<String>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create stack ledger directory {}", parent.display())
        })?;
    }

    let mut contents = names.iter().cloned().collect::<Vec<_>>().join("\n");
    contents.push('\n');
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write stack ledger {}", path.display()))
}
