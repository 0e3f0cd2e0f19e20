//! Feed-stock ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Farmer;

/// One immutable feed-stock movement for a farmer, in bags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLedgerEntry {
    pub id: String,
    /// Positive adds stock, negative deducts it
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    #[serde(default)]
    pub note: Option<String>,
    /// Correction target or paired transfer, depending on `entry_type`.
    /// Read it through [`StockLedgerEntry::corrects_entry_id`] or
    /// [`StockLedgerEntry::paired_transfer_id`].
    #[serde(default)]
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockLedgerEntry {
    pub fn is_correction(&self) -> bool {
        self.entry_type == LedgerEntryType::Correction
    }

    pub fn is_transfer(&self) -> bool {
        matches!(
            self.entry_type,
            LedgerEntryType::TransferIn | LedgerEntryType::TransferOut
        )
    }

    /// Id of the entry this correction adjusts. `None` for non-corrections.
    pub fn corrects_entry_id(&self) -> Option<&str> {
        if self.is_correction() {
            self.reference_id.as_deref()
        } else {
            None
        }
    }

    /// Id of the other half of a transfer. `None` for non-transfers.
    pub fn paired_transfer_id(&self) -> Option<&str> {
        if self.is_transfer() {
            self.reference_id.as_deref()
        } else {
            None
        }
    }
}

/// Ledger entry kinds. Unrecognised kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LedgerEntryType {
    Restock,
    TransferIn,
    TransferOut,
    CycleClose,
    Correction,
    Other(String),
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &str {
        match self {
            LedgerEntryType::Restock => "RESTOCK",
            LedgerEntryType::TransferIn => "TRANSFER_IN",
            LedgerEntryType::TransferOut => "TRANSFER_OUT",
            LedgerEntryType::CycleClose => "CYCLE_CLOSE",
            LedgerEntryType::Correction => "CORRECTION",
            LedgerEntryType::Other(raw) => raw,
        }
    }

    /// Human label: underscores become spaces and each word is title-cased
    pub fn label(&self) -> String {
        format_type_label(self.as_str())
    }
}

impl From<String> for LedgerEntryType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "RESTOCK" => LedgerEntryType::Restock,
            "TRANSFER_IN" => LedgerEntryType::TransferIn,
            "TRANSFER_OUT" => LedgerEntryType::TransferOut,
            "CYCLE_CLOSE" => LedgerEntryType::CycleClose,
            "CORRECTION" => LedgerEntryType::Correction,
            _ => LedgerEntryType::Other(raw),
        }
    }
}

impl From<&str> for LedgerEntryType {
    fn from(raw: &str) -> Self {
        LedgerEntryType::from(raw.to_string())
    }
}

impl From<LedgerEntryType> for String {
    fn from(entry_type: LedgerEntryType) -> Self {
        match entry_type {
            LedgerEntryType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for LedgerEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `TRANSFER_OUT` -> `Transfer Out`
pub fn format_type_label(raw: &str) -> String {
    raw.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A farmer's ledger as exported by the stock-history and farmer-details queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerLedger {
    pub farmer: Farmer,
    #[serde(default)]
    pub entries: Vec<StockLedgerEntry>,
}
