//! # Provisioning Metrics
//!
//! Metrics for provisioning runs: outcomes, declared objects and run duration.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounterVec};
use std::sync::LazyLock;

static PROVISIONING_RUNS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "apigateway_provisioning_runs_total",
            "Total number of provisioning runs by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create PROVISIONING_RUNS_TOTAL metric - this should never happen")
});

static PROVISIONING_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "apigateway_provisioning_duration_seconds",
            "Duration of provisioning runs in seconds",
        )
        .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0]),
    )
    .expect("Failed to create PROVISIONING_DURATION metric - this should never happen")
});

static DECLARATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "apigateway_declarations_total",
            "Total number of declared gateway objects by kind",
        ),
        &["kind"],
    )
    .expect("Failed to create DECLARATIONS_TOTAL metric - this should never happen")
});

/// Register provisioning metrics with the registry
pub(crate) fn register_provisioning_metrics() -> Result<()> {
    REGISTRY.register(Box::new(PROVISIONING_RUNS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PROVISIONING_DURATION.clone()))?;
    REGISTRY.register(Box::new(DECLARATIONS_TOTAL.clone()))?;
    Ok(())
}

/// `outcome` is `success` or a [`crate::error::ProvisioningError::as_str`] label
pub fn increment_provisioning_runs(outcome: &str) {
    PROVISIONING_RUNS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn observe_provisioning_duration(duration_secs: f64) {
    PROVISIONING_DURATION.observe(duration_secs);
}

pub fn increment_declarations(kind: &str, count: usize) {
    DECLARATIONS_TOTAL
        .with_label_values(&[kind])
        .inc_by(u64::try_from(count).unwrap_or(u64::MAX));
}
