//! Poultry Operations - ledger maintenance CLI

use clap::Parser;
use poultry_ops_maintenance::{cli::Cli, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pops_ledger=info,poultry_ops_maintenance=info,shared=warn".into());

    // Logs go to stderr so reports on stdout stay machine-readable
    let json = std::env::var("POPS_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;
    tracing::debug!(environment = %config.environment, "Configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = cli.run(&config, &mut out) {
        tracing::error!(code = err.code(), "{}", err);
        std::process::exit(i32::from(err.exit_code()));
    }

    Ok(())
}
