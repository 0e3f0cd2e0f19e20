//! Errors raised while decoding ledger data handed to the shared crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid {what} JSON: {source}")]
    InvalidJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Decode a JSON payload, naming the payload in the error
pub fn from_json<T: serde::de::DeserializeOwned>(what: &'static str, json: &str) -> LedgerResult<T> {
    serde_json::from_str(json).map_err(|source| LedgerError::InvalidJson { what, source })
}
