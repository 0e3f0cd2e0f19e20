//! Stock ledger reconciliation tests
//!
//! Tests for correction and reversal handling including:
//! - Correction accumulation and revert detection
//! - Row action visibility
//! - Order preservation and totality

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    reconcile, reconcile_with, Farmer, LedgerEntryType, LedgerIssue, LedgerView,
    ReconciliationOptions, RequestContext, RowAction, StockLedgerEntry, ViewMode,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn entry(id: &str, amount: &str, kind: &str, reference: Option<&str>) -> StockLedgerEntry {
    StockLedgerEntry {
        id: id.to_string(),
        amount: dec(amount),
        entry_type: LedgerEntryType::from(kind),
        note: None,
        reference_id: reference.map(str::to_string),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_uncorrected_entries() {
        let entries = vec![
            entry("r1", "10", "RESTOCK", None),
            entry("x1", "-2", "FEED_SALE", None),
        ];
        for row in reconcile(&entries) {
            assert!(!row.is_corrected);
            assert!(!row.is_fully_reverted);
            assert!(!row.is_edited);
            assert!(row.show_actions);
            assert_eq!(row.correction_sum, Decimal::ZERO);
            assert_eq!(row.actions, vec![RowAction::Edit, RowAction::Revert]);
        }
    }

    #[test]
    fn test_full_revert() {
        let entries = vec![
            entry("c1", "-10", "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
        ];
        let rows = reconcile(&entries);
        let original = &rows[1];
        assert!(original.is_corrected);
        assert!(original.is_fully_reverted);
        assert!(!original.is_edited);
        assert!(!original.show_actions);
        assert!(original.actions.is_empty());
        assert_eq!(original.correction_sum, dec("-10"));
    }

    #[test]
    fn test_partial_correction() {
        let entries = vec![
            entry("c1", "-4", "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
        ];
        let original = &reconcile(&entries)[1];
        assert!(original.is_corrected);
        assert!(!original.is_fully_reverted);
        assert!(original.is_edited);
        assert!(original.show_actions);
        assert_eq!(original.correction_sum, dec("-4"));
    }

    #[test]
    fn test_corrections_accumulate() {
        let entries = vec![
            entry("c2", "-4", "CORRECTION", Some("r1")),
            entry("c1", "-6", "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
        ];
        let original = &reconcile(&entries)[2];
        assert_eq!(original.correction_sum, dec("-10"));
        assert!(original.is_fully_reverted);
        assert!(!original.is_edited);
    }

    #[test]
    fn test_correction_rows_never_show_actions() {
        let entries = vec![
            entry("c2", "1", "CORRECTION", Some("c1")),
            entry("c1", "-4", "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
        ];
        let rows = reconcile(&entries);
        assert!(!rows[0].show_actions);
        assert!(!rows[1].show_actions);
        // c1 is itself corrected but still offers nothing but navigation
        assert!(rows[1].is_corrected);
        assert_eq!(
            rows[1].actions,
            vec![RowAction::ViewOriginal {
                entry_id: "r1".to_string()
            }]
        );
    }

    #[test]
    fn test_cycle_close_never_shows_actions() {
        let rows = reconcile(&[entry("cc", "-30", "CYCLE_CLOSE", None)]);
        assert!(!rows[0].is_corrected);
        assert!(!rows[0].show_actions);
        assert!(rows[0].actions.is_empty());
        assert_eq!(rows[0].type_label, "Cycle Close");
    }

    #[test]
    fn test_tolerance_boundary() {
        let rows = reconcile(&[
            entry("c1", "-10", "CORRECTION", Some("r1")),
            entry("r1", "10.0001", "RESTOCK", None),
        ]);
        assert!(rows[1].is_fully_reverted);
        assert!(!rows[1].is_edited);

        let rows = reconcile(&[
            entry("c1", "-10", "CORRECTION", Some("r1")),
            entry("r1", "10.01", "RESTOCK", None),
        ]);
        assert!(!rows[1].is_fully_reverted);
        assert!(rows[1].is_edited);

        // a residual equal to the tolerance is not a revert
        let rows = reconcile(&[
            entry("c1", "-10", "CORRECTION", Some("r1")),
            entry("r1", "10.001", "RESTOCK", None),
        ]);
        assert!(!rows[1].is_fully_reverted);
        assert!(rows[1].is_edited);
        assert!(rows[1].show_actions);
    }

    #[test]
    fn test_out_of_range_corrections_count_as_edits() {
        let max = Decimal::MAX.to_string();
        let entries = vec![
            entry("c1", &max, "CORRECTION", Some("r1")),
            entry("c2", &max, "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
            entry("c3", "1", "CORRECTION", Some("r2")),
            entry("r2", &max, "RESTOCK", None),
        ];
        let result = reconcile_with(&entries, &ReconciliationOptions::default());

        let r1 = &result.rows[2];
        assert!(r1.is_corrected);
        assert!(!r1.is_fully_reverted);
        assert!(r1.is_edited);
        assert_eq!(r1.correction_sum, Decimal::MAX);

        // the correction sum fits, only amount plus sum does not
        let r2 = &result.rows[4];
        assert!(r2.is_edited);
        assert!(!r2.is_fully_reverted);
        assert_eq!(r2.correction_sum, dec("1"));

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].code(), "CORRECTION_OVERFLOW");
        assert_eq!(result.issues[0].entry_id(), "r1");
    }

    #[test]
    fn test_custom_tolerance() {
        let entries = vec![
            entry("c1", "-10", "CORRECTION", Some("r1")),
            entry("r1", "10.01", "RESTOCK", None),
        ];
        let options = ReconciliationOptions {
            tolerance: dec("0.05"),
        };
        let result = reconcile_with(&entries, &options);
        assert!(result.rows[1].is_fully_reverted);
    }

    #[test]
    fn test_dangling_correction_degrades_silently() {
        let entries = vec![
            entry("c1", "-10", "CORRECTION", Some("missing")),
            entry("r1", "10", "RESTOCK", None),
        ];
        let result = reconcile_with(&entries, &ReconciliationOptions::default());
        assert_eq!(result.rows.len(), 2);
        assert!(!result.rows[0].show_actions);
        assert!(result.rows[0].actions.is_empty());
        assert!(!result.rows[1].is_corrected);
        assert!(result.rows[1].show_actions);
        assert_eq!(
            result.issues,
            vec![LedgerIssue::DanglingCorrection {
                correction_id: "c1".to_string(),
                target_id: "missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_transfer_rows_offer_transfer_revert() {
        let rows = reconcile(&[
            entry("t_out", "-5", "TRANSFER_OUT", Some("t_in")),
            entry("t_lonely", "5", "TRANSFER_IN", None),
        ]);
        assert_eq!(
            rows[0].actions,
            vec![RowAction::RevertTransfer {
                paired_transfer_id: "t_in".to_string()
            }]
        );
        assert!(rows[1].show_actions);
        assert!(rows[1].actions.is_empty());
    }

    #[test]
    fn test_transfer_reference_is_not_a_correction() {
        let rows = reconcile(&[
            entry("t_out", "-5", "TRANSFER_OUT", Some("t_in")),
            entry("t_in", "5", "TRANSFER_IN", Some("t_out")),
        ]);
        assert!(rows.iter().all(|r| !r.is_corrected));
    }

    #[test]
    fn test_display_fields() {
        let rows = reconcile(&[entry("t_out", "-5.50", "TRANSFER_OUT", Some("t_in"))]);
        assert_eq!(rows[0].type_label, "Transfer Out");
        assert_eq!(rows[0].formatted_amount.text, "-5.5");
    }

    #[test]
    fn test_management_view_is_read_only() {
        let farmer = Farmer {
            id: "farmer_1".to_string(),
            name: "Rahim".to_string(),
            main_stock: dec("6"),
            organization_id: Some("org_1".to_string()),
        };
        let entries = vec![
            entry("c1", "-4", "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
        ];

        let officer = LedgerView::build(
            &RequestContext::new("org_1", ViewMode::Officer),
            &farmer,
            &entries,
            &ReconciliationOptions::default(),
        );
        let manager = LedgerView::build(
            &RequestContext::new("org_1", ViewMode::Management),
            &farmer,
            &entries,
            &ReconciliationOptions::default(),
        );

        assert_eq!(officer.main_stock, dec("6"));
        assert_eq!(officer.rows[1].actions.len(), 2);
        assert!(manager.rows[1].actions.is_empty());
        assert_eq!(manager.rows[1].show_actions, officer.rows[1].show_actions);
        assert_eq!(manager.rows[0].actions, officer.rows[0].actions);
        assert_eq!(
            manager.rows[0].actions,
            vec![RowAction::ViewOriginal {
                entry_id: "r1".to_string()
            }]
        );
    }

    #[test]
    fn test_display_row_json_shape() {
        let rows = reconcile(&[
            entry("c1", "-4", "CORRECTION", Some("r1")),
            entry("r1", "10", "RESTOCK", None),
        ]);
        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["type"], "RESTOCK");
        assert_eq!(json["typeLabel"], "Restock");
        assert_eq!(json["isEdited"], true);
        assert_eq!(json["actions"][0]["kind"], "EDIT");

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["referenceId"], "r1");
        assert_eq!(json["actions"][0]["kind"], "VIEW_ORIGINAL");
        assert_eq!(json["actions"][0]["entryId"], "r1");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn type_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("RESTOCK"),
            Just("TRANSFER_IN"),
            Just("TRANSFER_OUT"),
            Just("CYCLE_CLOSE"),
            Just("CORRECTION"),
            Just("FEED_SALE"),
        ]
    }

    /// Entries whose references point at arbitrary ids, some of them dangling
    fn ledger_strategy() -> impl Strategy<Value = Vec<StockLedgerEntry>> {
        prop::collection::vec(
            (amount_strategy(), type_strategy(), prop::option::of(0usize..30)),
            0..25,
        )
        .prop_map(|raw| {
            let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
            raw.into_iter()
                .enumerate()
                .map(|(i, (amount, kind, reference))| StockLedgerEntry {
                    id: format!("e{}", i),
                    amount,
                    entry_type: LedgerEntryType::from(kind),
                    note: None,
                    reference_id: reference.map(|r| format!("e{}", r)),
                    created_at: base + Duration::minutes(i as i64),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Output mirrors input length and order
        #[test]
        fn prop_order_preserved(entries in ledger_strategy()) {
            let rows = reconcile(&entries);
            prop_assert_eq!(rows.len(), entries.len());
            for (row, entry) in rows.iter().zip(entries.iter()) {
                prop_assert_eq!(&row.entry, entry);
            }
        }

        /// Flags are mutually consistent for every row
        #[test]
        fn prop_flags_consistent(entries in ledger_strategy()) {
            for row in reconcile(&entries) {
                prop_assert!(!(row.is_fully_reverted && row.is_edited));
                prop_assert_eq!(row.is_corrected, row.is_fully_reverted || row.is_edited);
                if !row.is_corrected {
                    prop_assert_eq!(row.correction_sum, Decimal::ZERO);
                }
                if row.entry.entry_type == LedgerEntryType::Correction
                    || row.entry.entry_type == LedgerEntryType::CycleClose
                    || row.is_fully_reverted
                {
                    prop_assert!(!row.show_actions);
                }
            }
        }

        /// correctionSum equals the sum of corrections naming the entry
        #[test]
        fn prop_correction_sum_matches(entries in ledger_strategy()) {
            let rows = reconcile(&entries);
            for row in &rows {
                let expected: Decimal = entries
                    .iter()
                    .filter(|e| e.entry_type == LedgerEntryType::Correction)
                    .filter(|e| e.reference_id.as_deref() == Some(row.entry.id.as_str()))
                    .map(|e| e.amount)
                    .sum();
                prop_assert_eq!(row.correction_sum, expected);
            }
        }

        /// A single exact negation always reverts the original
        #[test]
        fn prop_exact_negation_reverts(amount in amount_strategy()) {
            let entries = vec![
                entry("c1", &(-amount).to_string(), "CORRECTION", Some("r1")),
                entry("r1", &amount.to_string(), "RESTOCK", None),
            ];
            let rows = reconcile(&entries);
            prop_assert!(rows[1].is_fully_reverted);
            prop_assert!(!rows[1].show_actions);
        }
    }
}
