//! Error handling for the ledger maintenance tool

use std::path::PathBuf;

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    // Input errors
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ledger(#[from] shared::LedgerError),

    // Output errors
    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Audit outcome
    #[error("Ledger audit failed for {failed} of {total} farmer(s)")]
    AuditFailed { failed: usize, total: usize },
}

impl AppError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) | AppError::ConfigLoad(_) | AppError::InvalidConfig(_) => {
                "CONFIGURATION_ERROR"
            }
            AppError::Io { .. } => "IO_ERROR",
            AppError::Ledger(err) => err.code(),
            AppError::Output(_) | AppError::Json(_) | AppError::Csv(_) => "OUTPUT_ERROR",
            AppError::AuditFailed { .. } => "AUDIT_FAILED",
        }
    }

    /// Process exit status for the CLI
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::AuditFailed { .. } => 1,
            AppError::Configuration(_) | AppError::ConfigLoad(_) | AppError::InvalidConfig(_) => 78,
            AppError::Io { .. } | AppError::Ledger(_) => 65,
            AppError::Output(_) | AppError::Json(_) | AppError::Csv(_) => 74,
        }
    }
}

/// Result type alias for services
pub type AppResult<T> = Result<T, AppError>;
