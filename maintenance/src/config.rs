//! Configuration management for the ledger maintenance tool
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with POPS_ prefix

use config::{Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{MetricSettings, MortalityThresholds, ReconciliationOptions};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Ledger reconciliation settings
    #[validate]
    pub ledger: LedgerConfig,

    /// Mortality alert thresholds
    #[validate]
    pub mortality: MortalityConfig,

    /// Report output settings
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LedgerConfig {
    /// Absolute difference, in bags, treated as a full revert
    #[validate(range(min = 0.0, max = 1.0))]
    pub tolerance: f64,

    /// Weight of one feed bag
    #[validate(range(min = 1.0, max = 100.0))]
    pub bag_weight_kg: f64,
}

#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_threshold_order"))]
pub struct MortalityConfig {
    #[validate(range(min = 0.0, max = 100.0))]
    pub warning_percent: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub critical_percent: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Default output format when --format is not given
    pub format: ReportFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Table,
    Json,
    Csv,
}

fn validate_threshold_order(config: &MortalityConfig) -> Result<(), ValidationError> {
    if config.warning_percent > config.critical_percent {
        return Err(ValidationError::new("warning_above_critical"));
    }
    Ok(())
}

fn to_decimal(field: &str, value: f64) -> AppResult<Decimal> {
    Decimal::try_from(value)
        .map_err(|e| AppError::Configuration(format!("{} is not a valid decimal: {}", field, e)))
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let environment = std::env::var("POPS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("ledger.tolerance", 0.001)?
            .set_default("ledger.bag_weight_kg", 50.0)?
            .set_default("mortality.warning_percent", 3.0)?
            .set_default("mortality.critical_percent", 5.0)?
            .set_default("report.format", "table")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (POPS_ prefix)
            .add_source(
                Environment::with_prefix("POPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn reconciliation_options(&self) -> AppResult<ReconciliationOptions> {
        Ok(ReconciliationOptions {
            tolerance: to_decimal("ledger.tolerance", self.ledger.tolerance)?,
        })
    }

    pub fn metric_settings(&self) -> AppResult<MetricSettings> {
        Ok(MetricSettings {
            bag_weight_kg: to_decimal("ledger.bag_weight_kg", self.ledger.bag_weight_kg)?,
            mortality: MortalityThresholds {
                warning_percent: to_decimal(
                    "mortality.warning_percent",
                    self.mortality.warning_percent,
                )?,
                critical_percent: to_decimal(
                    "mortality.critical_percent",
                    self.mortality.critical_percent,
                )?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            ledger: LedgerConfig::default(),
            mortality: MortalityConfig::default(),
            report: ReportConfig {
                format: ReportFormat::Table,
            },
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            bag_weight_kg: 50.0,
        }
    }
}

impl Default for MortalityConfig {
    fn default() -> Self {
        Self {
            warning_percent: 3.0,
            critical_percent: 5.0,
        }
    }
}
