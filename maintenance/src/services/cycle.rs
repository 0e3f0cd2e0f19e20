//! Cycle metrics service

use std::path::Path;

use shared::{Cycle, CycleMetrics, MetricSettings, MortalityStatus};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct CycleService {
    settings: MetricSettings,
}

impl CycleService {
    pub fn new(settings: MetricSettings) -> Self {
        Self { settings }
    }

    /// Read a JSON array of cycles
    pub fn load_cycles(path: &Path) -> AppResult<Vec<Cycle>> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(shared::from_json("cycles", &json)?)
    }

    pub fn compute(&self, cycles: &[Cycle]) -> Vec<CycleMetrics> {
        cycles
            .iter()
            .map(|cycle| {
                let metrics = CycleMetrics::compute(cycle, &self.settings);
                if metrics.mortality_status == Some(MortalityStatus::Critical) {
                    tracing::warn!(
                        cycle_id = %cycle.id,
                        farmer_id = %cycle.farmer_id,
                        rate = ?metrics.mortality_rate,
                        "Critical mortality"
                    );
                }
                metrics
            })
            .collect()
    }
}
