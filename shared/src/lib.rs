//! Shared types and computations for the poultry operations dashboard
//!
//! This crate contains the models and the client-side arithmetic shared
//! between the dashboard (via WASM) and the maintenance tooling.

pub mod error;
pub mod metrics;
pub mod models;
pub mod reconciliation;
pub mod types;
pub mod validation;

pub use error::*;
pub use metrics::*;
pub use models::*;
pub use reconciliation::*;
pub use types::*;
pub use validation::*;
