//! REST API Server for the two-batch threshold backtest
//!
//! Usage:
//!   ./target/release/api_server [--port PORT] [--config PATH]
//!
//! REST endpoints:
//!   GET  /api/v1/health     - Health check
//!   GET  /api/v1/defaults   - Default parameters and expected columns
//!   POST /api/v1/backtest   - Run a backtest on a CSV body
//!        ?sim_threshold_pct=15&min_combo_orders=1&max_avg_delta=50&p90_uplift_cap_pct=18&combo=X

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use two_batch_backtest::api::{create_router, BacktestService};
use two_batch_backtest::{Backtest, BacktestConfig};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve the two-batch threshold backtest over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// JSON config with column names and default parameters
    #[arg(long)]
    config: Option<PathBuf>,
}

fn print_banner(port: u16) {
    println!("============================================================");
    println!("         TWO-BATCH THRESHOLD BACKTEST API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health             Health check");
    println!("  GET  /api/v1/defaults           Default parameters");
    println!("  POST /api/v1/backtest           Run backtest (CSV body)");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => BacktestConfig::load(path)?,
        None => BacktestConfig::default(),
    };
    // Fail at startup rather than on every request
    Backtest::from_config(&config)?;

    print_banner(args.port);

    let service = Arc::new(BacktestService::new(config));
    let app = create_router(service);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
