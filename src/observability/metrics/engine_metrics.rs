//! # Engine Metrics
//!
//! Metrics for calls against the AWS provisioning engine and for stack CLI invocations.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{HistogramVec, IntCounterVec};
use std::sync::LazyLock;

static ENGINE_CALLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "apigateway_engine_calls_total",
            "Total number of provisioning engine calls by declaration kind",
        ),
        &["kind"],
    )
    .expect("Failed to create ENGINE_CALLS_TOTAL metric - this should never happen")
});

static ENGINE_CALL_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "apigateway_engine_call_duration_seconds",
            "Duration of provisioning engine calls in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["kind"],
    )
    .expect("Failed to create ENGINE_CALL_DURATION metric - this should never happen")
});

static ENGINE_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "apigateway_engine_errors_total",
            "Total number of failed provisioning engine calls by declaration kind",
        ),
        &["kind"],
    )
    .expect("Failed to create ENGINE_ERRORS_TOTAL metric - this should never happen")
});

static STACK_CLI_INVOCATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "apigateway_stack_cli_invocations_total",
            "Total number of stack CLI invocations by command and outcome",
        ),
        &["command", "outcome"],
    )
    .expect("Failed to create STACK_CLI_INVOCATIONS_TOTAL metric - this should never happen")
});

/// Register engine metrics with the registry
pub(crate) fn register_engine_metrics() -> Result<()> {
    REGISTRY.register(Box::new(ENGINE_CALLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ENGINE_CALL_DURATION.clone()))?;
    REGISTRY.register(Box::new(ENGINE_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STACK_CLI_INVOCATIONS_TOTAL.clone()))?;
    Ok(())
}

pub fn record_engine_call(kind: &str, duration_secs: f64) {
    ENGINE_CALLS_TOTAL.with_label_values(&[kind]).inc();
    ENGINE_CALL_DURATION
        .with_label_values(&[kind])
        .observe(duration_secs);
}

pub fn increment_engine_errors(kind: &str) {
    ENGINE_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_stack_cli_invocations(command: &str, outcome: &str) {
    STACK_CLI_INVOCATIONS_TOTAL
        .with_label_values(&[command, outcome])
        .inc();
}
