//! Stock ledger correction and reversal reconciliation
//!
//! Works out, for every ledger entry, whether later `CORRECTION` entries have
//! edited it or cancelled it out, and which row actions the dashboard should
//! offer. Pure and total: the input is never modified and order is kept.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Farmer, LedgerEntryType, StockLedgerEntry};
use crate::types::RequestContext;
use crate::validation::{find_ledger_issues, LedgerIssue};

/// Absolute tolerance, in bags, under which a corrected entry counts as reverted
pub fn default_tolerance() -> Decimal {
    Decimal::new(1, 3)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationOptions {
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
}

impl Default for ReconciliationOptions {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

/// Running total of the corrections against one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionTotal {
    /// Saturates at `Decimal::MAX`/`Decimal::MIN` once `overflowed` is set
    pub sum: Decimal,
    pub overflowed: bool,
}

impl CorrectionTotal {
    fn add(self, amount: Decimal) -> Self {
        match self.sum.checked_add(amount) {
            Some(sum) => Self {
                sum,
                overflowed: self.overflowed,
            },
            None => Self {
                sum: self.sum.saturating_add(amount),
                overflowed: true,
            },
        }
    }
}

impl Default for CorrectionTotal {
    fn default() -> Self {
        Self {
            sum: Decimal::ZERO,
            overflowed: false,
        }
    }
}

/// Correction totals keyed by the id of the entry they correct
#[derive(Debug, Default)]
pub struct CorrectionIndex<'a> {
    totals: HashMap<&'a str, CorrectionTotal>,
}

impl<'a> CorrectionIndex<'a> {
    pub fn build(entries: &'a [StockLedgerEntry]) -> Self {
        let totals = entries
            .iter()
            .filter_map(|e| e.corrects_entry_id().map(|target| (target, e.amount)))
            .fold(HashMap::new(), |mut totals, (target, amount)| {
                // Additive: every correction against a target counts
                let total: &mut CorrectionTotal = totals.entry(target).or_default();
                *total = total.add(amount);
                totals
            });
        Self { totals }
    }

    /// `None` when nothing corrects `entry_id`
    pub fn total(&self, entry_id: &str) -> Option<CorrectionTotal> {
        self.totals.get(entry_id).copied()
    }

    pub fn correction_sum(&self, entry_id: &str) -> Option<Decimal> {
        self.total(entry_id).map(|t| t.sum)
    }
}

/// Effective value of `amount` after its corrections; `None` when the
/// arithmetic leaves the decimal range
pub fn corrected_amount(amount: Decimal, total: CorrectionTotal) -> Option<Decimal> {
    if total.overflowed {
        return None;
    }
    amount.checked_add(total.sum)
}

/// Sign used to colour an amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AmountTone {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedAmount {
    pub text: String,
    pub tone: AmountTone,
}

/// `10.50` -> `+10.5`, `-4` -> `-4`, `0.00` -> `0`
pub fn format_amount(amount: Decimal) -> FormattedAmount {
    let normalized = amount.normalize();
    if normalized.is_zero() {
        FormattedAmount {
            text: "0".to_string(),
            tone: AmountTone::Neutral,
        }
    } else if normalized.is_sign_positive() {
        FormattedAmount {
            text: format!("+{}", normalized),
            tone: AmountTone::Positive,
        }
    } else {
        FormattedAmount {
            text: normalized.to_string(),
            tone: AmountTone::Negative,
        }
    }
}

/// Affordance a ledger row offers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowAction {
    Edit,
    Revert,
    #[serde(rename_all = "camelCase")]
    RevertTransfer { paired_transfer_id: String },
    #[serde(rename_all = "camelCase")]
    ViewOriginal { entry_id: String },
}

/// A ledger entry together with its derived display state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    #[serde(flatten)]
    pub entry: StockLedgerEntry,
    pub type_label: String,
    pub formatted_amount: FormattedAmount,
    pub correction_sum: Decimal,
    pub is_corrected: bool,
    pub is_fully_reverted: bool,
    pub is_edited: bool,
    pub show_actions: bool,
    pub actions: Vec<RowAction>,
}

/// Rows plus the reference problems found while building them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reconciliation {
    pub rows: Vec<DisplayRow>,
    pub issues: Vec<LedgerIssue>,
}

/// Derive display rows with the default tolerance
pub fn reconcile(entries: &[StockLedgerEntry]) -> Vec<DisplayRow> {
    reconcile_with(entries, &ReconciliationOptions::default()).rows
}

pub fn reconcile_with(
    entries: &[StockLedgerEntry],
    options: &ReconciliationOptions,
) -> Reconciliation {
    let index = CorrectionIndex::build(entries);
    let known_ids: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();

    let rows = entries
        .iter()
        .map(|entry| derive_row(entry, &index, &known_ids, options.tolerance))
        .collect();

    let issues = find_ledger_issues(entries);
    for issue in &issues {
        tracing::warn!(issue = %issue, "stock ledger reference issue");
    }

    Reconciliation { rows, issues }
}

fn derive_row(
    entry: &StockLedgerEntry,
    index: &CorrectionIndex<'_>,
    known_ids: &HashSet<&str>,
    tolerance: Decimal,
) -> DisplayRow {
    let total = index.total(&entry.id);
    let is_corrected = total.is_some();
    let correction_sum = total.map_or(Decimal::ZERO, |t| t.sum);
    // Out-of-range arithmetic counts as an edit, never as a revert
    let is_fully_reverted = total
        .and_then(|t| corrected_amount(entry.amount, t))
        .is_some_and(|effective| effective.abs() < tolerance);
    let is_edited = is_corrected && !is_fully_reverted;
    let show_actions = !entry.is_correction()
        && !is_fully_reverted
        && entry.entry_type != LedgerEntryType::CycleClose;

    let mut actions = Vec::new();
    if show_actions {
        if entry.is_transfer() {
            if let Some(paired) = entry.paired_transfer_id() {
                actions.push(RowAction::RevertTransfer {
                    paired_transfer_id: paired.to_string(),
                });
            }
        } else {
            actions.push(RowAction::Edit);
            actions.push(RowAction::Revert);
        }
    }
    if let Some(target) = entry.corrects_entry_id() {
        if known_ids.contains(target) {
            actions.push(RowAction::ViewOriginal {
                entry_id: target.to_string(),
            });
        }
    }

    DisplayRow {
        type_label: entry.entry_type.label(),
        formatted_amount: format_amount(entry.amount),
        correction_sum,
        is_corrected,
        is_fully_reverted,
        is_edited,
        show_actions,
        actions,
        entry: entry.clone(),
    }
}

/// Everything the farmer ledger page renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    pub farmer_id: String,
    pub main_stock: Decimal,
    pub rows: Vec<DisplayRow>,
    pub issues: Vec<LedgerIssue>,
}

impl LedgerView {
    pub fn build(
        context: &RequestContext,
        farmer: &Farmer,
        entries: &[StockLedgerEntry],
        options: &ReconciliationOptions,
    ) -> Self {
        let Reconciliation { mut rows, issues } = reconcile_with(entries, options);

        if !context.permits_ledger_mutations() {
            for row in &mut rows {
                row.actions
                    .retain(|action| matches!(action, RowAction::ViewOriginal { .. }));
            }
        }

        Self {
            farmer_id: farmer.id.clone(),
            main_stock: farmer.main_stock,
            rows,
            issues,
        }
    }
}
