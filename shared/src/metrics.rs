//! Cycle performance metrics: mortality, FCR and EPI

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Cycle;

/// Mortality percentages at which a cycle needs attention
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MortalityThresholds {
    pub warning_percent: Decimal,
    pub critical_percent: Decimal,
}

impl Default for MortalityThresholds {
    fn default() -> Self {
        Self {
            warning_percent: Decimal::from(3),
            critical_percent: Decimal::from(5),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MortalityStatus {
    Normal,
    Warning,
    Critical,
}

impl std::fmt::Display for MortalityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MortalityStatus::Normal => write!(f, "Normal"),
            MortalityStatus::Warning => write!(f, "Warning"),
            MortalityStatus::Critical => write!(f, "Critical"),
        }
    }
}

/// Mortality as a percentage of DOC; `None` for an empty placement
pub fn mortality_rate(doc: i32, mortality: i32) -> Option<Decimal> {
    if doc <= 0 {
        return None;
    }
    Some(Decimal::from(mortality.max(0)) * Decimal::ONE_HUNDRED / Decimal::from(doc))
}

pub fn classify_mortality(rate: Decimal, thresholds: &MortalityThresholds) -> MortalityStatus {
    if rate >= thresholds.critical_percent {
        MortalityStatus::Critical
    } else if rate >= thresholds.warning_percent {
        MortalityStatus::Warning
    } else {
        MortalityStatus::Normal
    }
}

/// Feed conversion ratio: kg of feed per kg of live weight
pub fn feed_conversion_ratio(feed_kg: Decimal, live_weight_kg: Decimal) -> Option<Decimal> {
    if live_weight_kg <= Decimal::ZERO {
        return None;
    }
    feed_kg.checked_div(live_weight_kg)
}

/// European Production Index
///
/// `(livability% * average weight kg) / (age days * FCR) * 100`, or `None`
/// when any step leaves the decimal range
pub fn european_production_index(
    livability_percent: Decimal,
    average_weight_kg: Decimal,
    age_days: i32,
    fcr: Decimal,
) -> Option<Decimal> {
    let denominator = Decimal::from(age_days).checked_mul(fcr)?;
    if denominator <= Decimal::ZERO {
        return None;
    }
    livability_percent
        .checked_mul(average_weight_kg)?
        .checked_div(denominator)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Inputs to cycle metrics that are not part of the cycle record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSettings {
    pub bag_weight_kg: Decimal,
    pub mortality: MortalityThresholds,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            bag_weight_kg: Decimal::from(50),
            mortality: MortalityThresholds::default(),
        }
    }
}

/// Derived performance figures for one cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub cycle_id: String,
    pub live_birds: i32,
    pub mortality_rate: Option<Decimal>,
    pub mortality_status: Option<MortalityStatus>,
    /// `None` when bags times bag weight leaves the decimal range
    pub feed_kg: Option<Decimal>,
    pub fcr: Option<Decimal>,
    pub epi: Option<Decimal>,
}

impl CycleMetrics {
    pub fn compute(cycle: &Cycle, settings: &MetricSettings) -> Self {
        let live_birds = cycle.live_birds();
        let mortality_rate = mortality_rate(cycle.doc, cycle.mortality);
        let mortality_status =
            mortality_rate.map(|rate| classify_mortality(rate, &settings.mortality));
        let feed_kg = cycle.feed_intake_bags.checked_mul(settings.bag_weight_kg);

        let fcr = match (feed_kg, cycle.average_weight_kg) {
            (Some(feed_kg), Some(weight)) => weight
                .checked_mul(Decimal::from(live_birds))
                .and_then(|live_weight| feed_conversion_ratio(feed_kg, live_weight)),
            _ => None,
        };
        let epi = match (cycle.average_weight_kg, fcr, mortality_rate) {
            (Some(weight), Some(fcr), Some(rate)) => {
                european_production_index(Decimal::ONE_HUNDRED - rate, weight, cycle.age_days, fcr)
            }
            _ => None,
        };

        Self {
            cycle_id: cycle.id.clone(),
            live_birds,
            mortality_rate: mortality_rate.map(|r| r.round_dp(2)),
            mortality_status,
            feed_kg,
            fcr: fcr.map(|f| f.round_dp(3)),
            epi: epi.map(|e| e.round_dp(0)),
        }
    }
}
