//! Command-line interface

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, ReportFormat};
use crate::error::AppResult;
use crate::services::{reporting, CycleService, LedgerService};

/// Stock ledger maintenance for the poultry operations dashboard
#[derive(Parser, Debug)]
#[command(name = "pops-ledger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format; defaults to report.format from configuration
    #[arg(long, short, global = true, value_enum, env = "POPS_REPORT_FORMAT")]
    pub format: Option<ReportFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a farmer ledger export with correction and revert state
    Reconcile {
        /// `{ farmer, entries }` JSON export
        file: PathBuf,
    },

    /// Check ledger exports for broken references and balance drift
    Audit {
        /// One or more `{ farmer, entries }` JSON exports
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Fail on reference issues as well as on drift
        #[arg(long)]
        strict: bool,
    },

    /// Compute mortality, FCR and EPI for a JSON array of cycles
    CycleMetrics {
        file: PathBuf,
    },
}

impl Cli {
    pub fn run<W: Write>(&self, config: &Config, out: &mut W) -> AppResult<()> {
        let format = self.format.unwrap_or(config.report.format);

        match &self.command {
            Command::Reconcile { file } => {
                let service = LedgerService::new(config.reconciliation_options()?);
                let ledger = LedgerService::load_export(file)?;
                let reconciliation = service.reconcile(&ledger);
                tracing::info!(
                    farmer_id = %ledger.farmer.id,
                    rows = reconciliation.rows.len(),
                    issues = reconciliation.issues.len(),
                    "Reconciled ledger"
                );
                reporting::render_rows(&reconciliation.rows, format, out)
            }
            Command::Audit { files, strict } => {
                let service = LedgerService::new(config.reconciliation_options()?);
                let ledgers = files
                    .iter()
                    .map(|file| LedgerService::load_export(file))
                    .collect::<AppResult<Vec<_>>>()?;
                let audits = service.audit_all(&ledgers);
                reporting::render_audits(&audits, format, out)?;
                LedgerService::ensure_passed(&audits, *strict)
            }
            Command::CycleMetrics { file } => {
                let service = CycleService::new(config.metric_settings()?);
                let cycles = CycleService::load_cycles(file)?;
                reporting::render_metrics(&service.compute(&cycles), format, out)
            }
        }
    }
}
