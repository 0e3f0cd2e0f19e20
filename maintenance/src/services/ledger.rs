//! Ledger service for reconciling and auditing exported farmer ledgers

use std::path::Path;

use serde::Serialize;
use shared::{
    audit_balance, find_ledger_issues, reconcile_with, BalanceAudit, FarmerLedger, LedgerIssue,
    Reconciliation, ReconciliationOptions,
};

use crate::error::{AppError, AppResult};

/// Stateless apart from the reconciliation options it was configured with
#[derive(Debug, Clone, Default)]
pub struct LedgerService {
    options: ReconciliationOptions,
}

/// Audit outcome for one farmer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAudit {
    pub farmer_id: String,
    pub farmer_name: String,
    pub entry_count: usize,
    pub issues: Vec<LedgerIssue>,
    pub balance: BalanceAudit,
}

impl LedgerAudit {
    /// A drifting balance always fails; issues fail only in strict mode
    pub fn passed(&self, strict: bool) -> bool {
        self.balance.within_tolerance && !(strict && !self.issues.is_empty())
    }
}

impl LedgerService {
    pub fn new(options: ReconciliationOptions) -> Self {
        Self { options }
    }

    /// Read a `{ farmer, entries }` export from disk
    pub fn load_export(path: &Path) -> AppResult<FarmerLedger> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ledger = Self::parse_export(&json)?;
        tracing::debug!(
            path = %path.display(),
            farmer_id = %ledger.farmer.id,
            entries = ledger.entries.len(),
            "Loaded ledger export"
        );
        Ok(ledger)
    }

    pub fn parse_export(json: &str) -> AppResult<FarmerLedger> {
        Ok(shared::from_json("farmer ledger", json)?)
    }

    pub fn reconcile(&self, ledger: &FarmerLedger) -> Reconciliation {
        reconcile_with(&ledger.entries, &self.options)
    }

    pub fn audit(&self, ledger: &FarmerLedger) -> LedgerAudit {
        let issues = find_ledger_issues(&ledger.entries);
        let balance = audit_balance(&ledger.farmer, &ledger.entries, self.options.tolerance);

        if !balance.within_tolerance {
            tracing::warn!(
                farmer_id = %ledger.farmer.id,
                main_stock = %balance.main_stock,
                ledger_total = ?balance.ledger_total,
                drift = ?balance.drift,
                "Ledger total does not match main stock"
            );
        }

        LedgerAudit {
            farmer_id: ledger.farmer.id.clone(),
            farmer_name: ledger.farmer.name.clone(),
            entry_count: ledger.entries.len(),
            issues,
            balance,
        }
    }

    pub fn audit_all(&self, ledgers: &[FarmerLedger]) -> Vec<LedgerAudit> {
        ledgers.iter().map(|l| self.audit(l)).collect()
    }

    /// Fail when any audit did not pass
    pub fn ensure_passed(audits: &[LedgerAudit], strict: bool) -> AppResult<()> {
        let failed = audits.iter().filter(|a| !a.passed(strict)).count();
        tracing::info!(total = audits.len(), failed, strict, "Ledger audit finished");

        if failed > 0 {
            return Err(AppError::AuditFailed {
                failed,
                total: audits.len(),
            });
        }
        Ok(())
    }
}
