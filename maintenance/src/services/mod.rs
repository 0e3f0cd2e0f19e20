//! Maintenance services

pub mod cycle;
pub mod ledger;
pub mod reporting;

pub use cycle::CycleService;
pub use ledger::{LedgerAudit, LedgerService};
