//! Poultry Operations - ledger maintenance tooling
//!
//! Reconciles exported farmer stock ledgers, reports broken correction and
//! transfer references, audits ledger totals against the server-maintained
//! main stock, and prints cycle performance metrics.

pub mod cli;
pub mod config;
pub mod error;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
