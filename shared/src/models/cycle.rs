//! Production cycle models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One batch of chicks from placement to sale or closure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: String,
    pub farmer_id: String,
    pub name: String,
    /// Day-old chicks placed
    pub doc: i32,
    pub mortality: i32,
    pub age_days: i32,
    /// Feed consumed so far, in bags
    pub feed_intake_bags: Decimal,
    #[serde(default)]
    pub average_weight_kg: Option<Decimal>,
    pub status: CycleStatus,
}

impl Cycle {
    /// Birds still alive; never negative
    pub fn live_birds(&self) -> i32 {
        self.doc.saturating_sub(self.mortality).max(0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    Active,
    Closed,
}
