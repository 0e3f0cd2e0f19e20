//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Role mode the dashboard is currently operating in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    #[default]
    Officer,
    Management,
    Admin,
}

/// Session state for one request: which organisation and in which role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub mode: ViewMode,
}

impl RequestContext {
    pub fn new(organization_id: impl Into<String>, mode: ViewMode) -> Self {
        Self {
            organization_id: Some(organization_id.into()),
            mode,
        }
    }

    /// Management is read-only oversight
    pub fn permits_ledger_mutations(&self) -> bool {
        !matches!(self.mode, ViewMode::Management)
    }
}
