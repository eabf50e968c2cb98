//! # Metrics Module
//!
//! Prometheus metrics for monitoring the provisioner, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text encoding
//! - `provisioning_metrics` - Provisioning runs, declarations and run duration
//! - `engine_metrics` - Provisioning engine calls and stack CLI invocations

pub mod engine_metrics;
pub mod provisioning_metrics;
pub mod registry;

pub use engine_metrics::*;
pub use provisioning_metrics::*;
pub use registry::*;
