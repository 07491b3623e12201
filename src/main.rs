//! Two-batch threshold backtest CLI
//!
//! Usage:
//!   two_batch_backtest --input orders.csv [--sim-threshold-pct 15] [--combo NAME]
//!                      [--export-dir out/] [--config backtest.json] [--json]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use two_batch_backtest::{export, ingest, report, Backtest, BacktestConfig};

/// Simulate a relaxed two-batch cost threshold and recommend combinations
#[derive(Parser, Debug)]
#[command(name = "two_batch_backtest")]
#[command(about = "Backtest a relaxed two-batch cost-uplift threshold per provider combination")]
struct Args {
    /// Order-level detail CSV
    #[arg(long)]
    input: PathBuf,

    /// JSON config with column names and parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated threshold in percent
    #[arg(long, value_parser = clap::value_parser!(u32).range(7..=25))]
    sim_threshold_pct: Option<u32>,

    /// Minimum blocked orders for a combination to be recommended
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    min_combo_orders: Option<u32>,

    /// P0 cap on mean per-order cost delta
    #[arg(long)]
    max_avg_delta: Option<f64>,

    /// P0 cap on P90 cost uplift in percent
    #[arg(long, value_parser = clap::value_parser!(u32).range(7..=50))]
    p90_uplift_cap_pct: Option<u32>,

    /// Print unlocked order detail for this combination
    #[arg(long)]
    combo: Option<String>,

    /// Directory for CSV exports
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, default_value = "false")]
    json: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<BacktestConfig> {
        let mut config = match &self.config {
            Some(path) => BacktestConfig::load(path)?,
            None => BacktestConfig::default(),
        };
        let params = &mut config.params;
        if let Some(pct) = self.sim_threshold_pct {
            params.sim_threshold = pct as f64 / 100.0;
        }
        if let Some(n) = self.min_combo_orders {
            params.min_combo_orders = n;
        }
        if let Some(delta) = self.max_avg_delta {
            params.max_avg_delta = delta;
        }
        if let Some(pct) = self.p90_uplift_cap_pct {
            params.p90_uplift_cap = pct as f64 / 100.0;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    let engine = Backtest::from_config(&config)?;

    info!("Reading CSV from {:?}", args.input);
    let raw = ingest::load_csv_file(&args.input)?;
    let result = engine.run_raw(&raw)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        report::print_report(&result, args.combo.as_deref());
    }

    if let Some(dir) = &args.export_dir {
        for path in export::export_report(&result, dir)? {
            info!("Wrote {:?}", path);
        }
    }

    Ok(())
}
