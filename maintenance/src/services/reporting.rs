//! Report rendering for reconciled rows, audits and cycle metrics
//! Writes table, JSON or CSV output to any writer

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{CycleMetrics, DisplayRow, RowAction};

use crate::config::ReportFormat;
use crate::error::AppResult;
use crate::services::ledger::LedgerAudit;

/// Flat CSV record for one reconciled row
#[derive(Debug, Serialize)]
struct RowRecord<'a> {
    id: &'a str,
    created_at: String,
    entry_type: &'a str,
    amount: Decimal,
    correction_sum: Decimal,
    status: &'static str,
    show_actions: bool,
    actions: String,
    reference_id: &'a str,
    note: &'a str,
}

/// Flat CSV record for one farmer audit
#[derive(Debug, Serialize)]
struct AuditRecord<'a> {
    farmer_id: &'a str,
    farmer_name: &'a str,
    entry_count: usize,
    main_stock: Decimal,
    ledger_total: Option<Decimal>,
    drift: Option<Decimal>,
    within_tolerance: bool,
    issue_count: usize,
    issues: String,
}

/// Flat CSV record for one cycle
#[derive(Debug, Serialize)]
struct MetricsRecord<'a> {
    cycle_id: &'a str,
    live_birds: i32,
    mortality_rate: Option<Decimal>,
    mortality_status: String,
    feed_kg: Option<Decimal>,
    fcr: Option<Decimal>,
    epi: Option<Decimal>,
}

/// Badge the dashboard would show for a row
pub fn row_status(row: &DisplayRow) -> &'static str {
    if row.is_fully_reverted {
        "reverted"
    } else if row.is_edited {
        "edited"
    } else {
        "-"
    }
}

fn action_label(action: &RowAction) -> String {
    match action {
        RowAction::Edit => "edit".to_string(),
        RowAction::Revert => "revert".to_string(),
        RowAction::RevertTransfer { paired_transfer_id } => {
            format!("revert-transfer:{}", paired_transfer_id)
        }
        RowAction::ViewOriginal { entry_id } => format!("view-original:{}", entry_id),
    }
}

fn action_list(row: &DisplayRow) -> String {
    row.actions.iter().map(action_label).collect::<Vec<_>>().join(" ")
}

fn optional(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn render_rows<W: Write>(rows: &[DisplayRow], format: ReportFormat, out: &mut W) -> AppResult<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for row in rows {
                writer.serialize(RowRecord {
                    id: &row.entry.id,
                    created_at: row.entry.created_at.to_rfc3339(),
                    entry_type: row.entry.entry_type.as_str(),
                    amount: row.entry.amount,
                    correction_sum: row.correction_sum,
                    status: row_status(row),
                    show_actions: row.show_actions,
                    actions: action_list(row),
                    reference_id: row.entry.reference_id.as_deref().unwrap_or(""),
                    note: row.entry.note.as_deref().unwrap_or(""),
                })?;
            }
            writer.flush()?;
        }
        ReportFormat::Table => {
            writeln!(
                out,
                "{:<20} {:<14} {:>10} {:>10} {:<9} ACTIONS",
                "ID", "TYPE", "AMOUNT", "CORR", "STATUS"
            )?;
            for row in rows {
                writeln!(
                    out,
                    "{:<20} {:<14} {:>10} {:>10} {:<9} {}",
                    row.entry.id,
                    row.type_label,
                    row.formatted_amount.text,
                    row.correction_sum.normalize(),
                    row_status(row),
                    action_list(row)
                )?;
            }
        }
    }
    Ok(())
}

pub fn render_audits<W: Write>(audits: &[LedgerAudit], format: ReportFormat, out: &mut W) -> AppResult<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, audits)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for audit in audits {
                writer.serialize(AuditRecord {
                    farmer_id: &audit.farmer_id,
                    farmer_name: &audit.farmer_name,
                    entry_count: audit.entry_count,
                    main_stock: audit.balance.main_stock,
                    ledger_total: audit.balance.ledger_total,
                    drift: audit.balance.drift,
                    within_tolerance: audit.balance.within_tolerance,
                    issue_count: audit.issues.len(),
                    issues: audit
                        .issues
                        .iter()
                        .map(|i| format!("{}:{}", i.code(), i.entry_id()))
                        .collect::<Vec<_>>()
                        .join(" "),
                })?;
            }
            writer.flush()?;
        }
        ReportFormat::Table => {
            for audit in audits {
                let verdict = if audit.balance.within_tolerance {
                    "OK"
                } else {
                    "DRIFT"
                };
                writeln!(
                    out,
                    "{} ({}) entries={} main_stock={} ledger_total={} drift={} [{}]",
                    audit.farmer_name,
                    audit.farmer_id,
                    audit.entry_count,
                    audit.balance.main_stock.normalize(),
                    optional(audit.balance.ledger_total),
                    optional(audit.balance.drift),
                    verdict
                )?;
                for issue in &audit.issues {
                    writeln!(out, "  {:<28} {}", issue.code(), issue)?;
                }
            }
        }
    }
    Ok(())
}

pub fn render_metrics<W: Write>(metrics: &[CycleMetrics], format: ReportFormat, out: &mut W) -> AppResult<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, metrics)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for m in metrics {
                writer.serialize(MetricsRecord {
                    cycle_id: &m.cycle_id,
                    live_birds: m.live_birds,
                    mortality_rate: m.mortality_rate,
                    mortality_status: m
                        .mortality_status
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    feed_kg: m.feed_kg,
                    fcr: m.fcr,
                    epi: m.epi,
                })?;
            }
            writer.flush()?;
        }
        ReportFormat::Table => {
            writeln!(
                out,
                "{:<20} {:>8} {:>10} {:<9} {:>10} {:>7} {:>6}",
                "CYCLE", "LIVE", "MORT %", "STATUS", "FEED KG", "FCR", "EPI"
            )?;
            for m in metrics {
                writeln!(
                    out,
                    "{:<20} {:>8} {:>10} {:<9} {:>10} {:>7} {:>6}",
                    m.cycle_id,
                    m.live_birds,
                    optional(m.mortality_rate),
                    m.mortality_status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    optional(m.feed_kg),
                    optional(m.fcr),
                    optional(m.epi)
                )?;
            }
        }
    }
    Ok(())
}
