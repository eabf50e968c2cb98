//! # Runtime Module
//!
//! Startup of the control surface: crypto provider, tracing, metrics, configuration,
//! stack registry and HTTP server.

pub mod initialization;

pub use initialization::*;
