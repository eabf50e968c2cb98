//! # API Gateway Provisioner
//!
//! Declarative AWS API Gateway provisioning: a path-tree resolver that turns flat route
//! lists into a deduplicated resource hierarchy, method and integration wiring, and an
//! HTTP control surface that invokes the stack CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod provider;
pub mod request;
pub mod runtime;
pub mod server;
pub mod stack;
pub mod validation;

pub use error::{ProvisioningError, ProvisioningResult};
pub use gateway::{ApiGateway, GatewaySettings, ProvisioningReport};
pub use provider::{PlanRecorder, ProvisioningEngine};
pub use request::{CreateApiGatewayRequest, RouteSpec};
