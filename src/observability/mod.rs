//! # Observability
//!
//! Prometheus metrics exposed on `/metrics`. Logging is plain `tracing`, initialised in
//! [`crate::runtime::initialization`] and in `gwctl`.

pub mod metrics;
