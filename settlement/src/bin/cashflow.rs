//! Cashflow netting command line
//!
//! Usage:
//!   cashflow <obligations.json> [--config config.toml]
//!   cashflow --demo [--config config.toml]
//!
//! The obligations file is a JSON array of rows with `group` (or
//! `group no.`, optional), `payer`, `payee` and `amount`. Settlement plans are printed to stdout as
//! JSON, one entry per group in ascending group order.

use anyhow::Context;
use clap::Parser;
use ledger_core::Obligation;
use rust_decimal_macros::dec;
use settlement::{Config, GroupedObligation, SettlementEngine};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cashflow")]
#[command(version)]
#[command(about = "Net pairwise obligations into a minimal set of transfers", long_about = None)]
struct Cli {
    /// JSON file of grouped obligations
    #[arg(required_unless_present = "demo", conflicts_with = "demo")]
    input: Option<PathBuf>,

    /// Run the built-in example cases instead of reading a file
    #[arg(long)]
    demo: bool,

    /// TOML configuration file (environment is used when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn demo_cases() -> Vec<GroupedObligation> {
    let cases = [
        // Basic triangle debt
        vec![
            Obligation::new("A", "B", dec!(100)),
            Obligation::new("B", "C", dec!(100)),
            Obligation::new("C", "A", dec!(100)),
        ],
        // Simple netting case
        vec![
            Obligation::new("A", "B", dec!(50)),
            Obligation::new("B", "C", dec!(30)),
            Obligation::new("A", "C", dec!(20)),
        ],
        // Four person complex debt
        vec![
            Obligation::new("A", "B", dec!(40)),
            Obligation::new("A", "C", dec!(30)),
            Obligation::new("B", "D", dec!(20)),
            Obligation::new("C", "D", dec!(50)),
        ],
    ];

    cases
        .into_iter()
        .zip(1..)
        .flat_map(|(obligations, group)| {
            obligations
                .into_iter()
                .map(move |obligation| GroupedObligation { group, obligation })
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::from_env().context("failed to load config from environment")?,
    };

    tracing::info!(
        "Starting {} v{}",
        config.service_name,
        config.service_version
    );

    let rows = match &cli.input {
        Some(input) if !cli.demo => {
            let content = std::fs::read_to_string(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            serde_json::from_str::<Vec<GroupedObligation>>(&content)
                .with_context(|| format!("failed to parse obligations in {}", input.display()))?
        }
        _ => demo_cases(),
    };

    let engine = SettlementEngine::new(config)?;
    let groups = engine.net_groups(&rows)?;

    for group in &groups {
        for transfer in &group.plan.transfers {
            tracing::info!(group = group.group, "{}", transfer);
        }
    }

    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}
