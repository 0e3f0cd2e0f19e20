//! Domain models for the poultry operations dashboard

mod cycle;
mod farmer;
mod ledger;

pub use cycle::*;
pub use farmer::*;
pub use ledger::*;
