//! Validation utilities for stock ledgers
//!
//! Nothing here changes what the dashboard displays. Issues are reported so
//! that malformed references are visible instead of silently ignored.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Farmer, StockLedgerEntry};
use crate::reconciliation::CorrectionIndex;

// ============================================================================
// Reference Checks
// ============================================================================

/// A problem with how ledger entries reference each other
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerIssue {
    /// Correction points at an id that is not in the ledger
    #[serde(rename_all = "camelCase")]
    DanglingCorrection {
        correction_id: String,
        target_id: String,
    },
    /// Correction with no target at all
    #[serde(rename_all = "camelCase")]
    UnattributedCorrection { correction_id: String },
    /// Correction recorded before the entry it corrects
    #[serde(rename_all = "camelCase")]
    CorrectionPrecedesTarget {
        correction_id: String,
        target_id: String,
    },
    #[serde(rename_all = "camelCase")]
    DuplicateEntryId { entry_id: String },
    /// Transfer with no paired entry, so it cannot be reverted
    #[serde(rename_all = "camelCase")]
    UnpairedTransfer { entry_id: String },
    /// Corrections against the entry add up past the decimal range
    #[serde(rename_all = "camelCase")]
    CorrectionOverflow { entry_id: String },
}

impl LedgerIssue {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerIssue::DanglingCorrection { .. } => "DANGLING_CORRECTION",
            LedgerIssue::UnattributedCorrection { .. } => "UNATTRIBUTED_CORRECTION",
            LedgerIssue::CorrectionPrecedesTarget { .. } => "CORRECTION_PRECEDES_TARGET",
            LedgerIssue::DuplicateEntryId { .. } => "DUPLICATE_ENTRY_ID",
            LedgerIssue::UnpairedTransfer { .. } => "UNPAIRED_TRANSFER",
            LedgerIssue::CorrectionOverflow { .. } => "CORRECTION_OVERFLOW",
        }
    }

    /// Id of the entry the issue is reported against
    pub fn entry_id(&self) -> &str {
        match self {
            LedgerIssue::DanglingCorrection { correction_id, .. }
            | LedgerIssue::UnattributedCorrection { correction_id }
            | LedgerIssue::CorrectionPrecedesTarget { correction_id, .. } => correction_id,
            LedgerIssue::DuplicateEntryId { entry_id }
            | LedgerIssue::UnpairedTransfer { entry_id }
            | LedgerIssue::CorrectionOverflow { entry_id } => entry_id,
        }
    }
}

impl std::fmt::Display for LedgerIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerIssue::DanglingCorrection {
                correction_id,
                target_id,
            } => write!(
                f,
                "correction {} references unknown entry {}",
                correction_id, target_id
            ),
            LedgerIssue::UnattributedCorrection { correction_id } => {
                write!(f, "correction {} has no reference", correction_id)
            }
            LedgerIssue::CorrectionPrecedesTarget {
                correction_id,
                target_id,
            } => write!(
                f,
                "correction {} was recorded before entry {}",
                correction_id, target_id
            ),
            LedgerIssue::DuplicateEntryId { entry_id } => {
                write!(f, "entry id {} appears more than once", entry_id)
            }
            LedgerIssue::UnpairedTransfer { entry_id } => {
                write!(f, "transfer {} has no paired entry", entry_id)
            }
            LedgerIssue::CorrectionOverflow { entry_id } => {
                write!(f, "corrections to entry {} exceed the decimal range", entry_id)
            }
        }
    }
}

/// Report reference problems in ledger order
pub fn find_ledger_issues(entries: &[StockLedgerEntry]) -> Vec<LedgerIssue> {
    let mut created: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut issues = Vec::new();
    let mut reported_duplicates: HashSet<&str> = HashSet::new();

    for entry in entries {
        if created.contains_key(entry.id.as_str()) {
            if reported_duplicates.insert(entry.id.as_str()) {
                issues.push(LedgerIssue::DuplicateEntryId {
                    entry_id: entry.id.clone(),
                });
            }
        } else {
            created.insert(entry.id.as_str(), entry.created_at);
        }
    }

    for entry in entries {
        if entry.is_correction() {
            match entry.corrects_entry_id() {
                None => issues.push(LedgerIssue::UnattributedCorrection {
                    correction_id: entry.id.clone(),
                }),
                Some(target) => match created.get(target) {
                    None => issues.push(LedgerIssue::DanglingCorrection {
                        correction_id: entry.id.clone(),
                        target_id: target.to_string(),
                    }),
                    Some(target_created) if entry.created_at < *target_created => {
                        issues.push(LedgerIssue::CorrectionPrecedesTarget {
                            correction_id: entry.id.clone(),
                            target_id: target.to_string(),
                        })
                    }
                    Some(_) => {}
                },
            }
        } else if entry.is_transfer() && entry.paired_transfer_id().is_none() {
            issues.push(LedgerIssue::UnpairedTransfer {
                entry_id: entry.id.clone(),
            });
        }
    }

    let index = CorrectionIndex::build(entries);
    let mut reported_overflows: HashSet<&str> = HashSet::new();
    for entry in entries {
        let overflowed = index.total(&entry.id).is_some_and(|t| t.overflowed);
        if overflowed && reported_overflows.insert(entry.id.as_str()) {
            issues.push(LedgerIssue::CorrectionOverflow {
                entry_id: entry.id.clone(),
            });
        }
    }

    issues
}

// ============================================================================
// Balance Audit
// ============================================================================

/// Sum of every ledger movement, corrections included; `None` when the sum
/// leaves the decimal range
pub fn effective_ledger_total(entries: &[StockLedgerEntry]) -> Option<Decimal> {
    entries
        .iter()
        .try_fold(Decimal::ZERO, |total, e| total.checked_add(e.amount))
}

/// Ledger total compared with the server-maintained balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAudit {
    pub farmer_id: String,
    pub main_stock: Decimal,
    /// `None` when the ledger cannot be summed within the decimal range
    pub ledger_total: Option<Decimal>,
    /// `main_stock - ledger_total`
    pub drift: Option<Decimal>,
    /// Never true for a ledger that could not be summed
    pub within_tolerance: bool,
}

pub fn audit_balance(
    farmer: &Farmer,
    entries: &[StockLedgerEntry],
    tolerance: Decimal,
) -> BalanceAudit {
    let ledger_total = effective_ledger_total(entries);
    let drift = ledger_total.and_then(|total| farmer.main_stock.checked_sub(total));
    BalanceAudit {
        farmer_id: farmer.id.clone(),
        main_stock: farmer.main_stock,
        ledger_total,
        drift,
        within_tolerance: drift.is_some_and(|d| d.abs() < tolerance),
    }
}
