//! Synthetic order-detail generator
//!
//! Produces a CSV in the backtest input layout with controlled random
//! variation, including the messy cells real exports contain (percentage
//! strings, placeholder dashes, blank fees).
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --orders <N>            Number of orders (default: 5000)
//!   --duplicate-rate <F>    Probability an order id repeats on a second row (default: 0.02)
//!   --placeholder-rate <F>  Probability an uplift cell is a placeholder (default: 0.03)
//!   --seed <N>              Random seed for reproducibility (optional)
//!   --output <PATH>         Output CSV path (default: data/synthetic_orders.csv)

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use two_batch_backtest::schema::ColumnNames;

/// Synthetic data generator for the backtest input
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic order-detail CSV for the two-batch backtest")]
struct Args {
    /// Number of distinct orders
    #[arg(long, default_value = "5000")]
    orders: usize,

    /// Probability that an order is written twice
    #[arg(long, default_value = "0.02")]
    duplicate_rate: f64,

    /// Probability that an uplift cell holds a placeholder instead of a value
    #[arg(long, default_value = "0.03")]
    placeholder_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/synthetic_orders.csv")]
    output: PathBuf,
}

/// Two-batch provider pairings and their typical uplift (fraction)
const COMBINATIONS: &[(&str, f64)] = &[
    ("顺丰+京东", 0.09),
    ("顺丰+中通", 0.12),
    ("京东+圆通", 0.16),
    ("中通+韵达", 0.11),
    ("德邦+顺丰", 0.22),
    ("EMS+中通", 0.14),
];

const PLACEHOLDERS: &[&str] = &["-", "--", "—", ""];

fn generate_order_id(rng: &mut impl Rng) -> String {
    format!("SO{:010}", rng.gen_range(0..10_000_000_000u64))
}

fn fmt_money(v: f64) -> String {
    format!("{:.2}", v)
}

/// Uplift as exports render it: mostly "16.40%", sometimes plain or a placeholder.
fn uplift_cell(uplift: f64, args: &Args, rng: &mut impl Rng) -> String {
    if rng.gen::<f64>() < args.placeholder_rate {
        return PLACEHOLDERS[rng.gen_range(0..PLACEHOLDERS.len())].to_string();
    }
    if rng.gen_bool(0.8) {
        format!("{:.2}%", uplift * 100.0)
    } else {
        format!("{:.2}", uplift * 100.0)
    }
}

/// One order row in `ColumnNames` order: required columns then impact columns.
fn generate_row(args: &Args, rng: &mut impl Rng) -> Vec<String> {
    let packages: u32 = rng.gen_range(1..=8);
    let batches: u32 = rng.gen_range(1..=packages.max(1));
    let (combo, typical) = COMBINATIONS[rng.gen_range(0..COMBINATIONS.len())];

    let uplift = (typical + rng.gen_range(-0.08..0.10)).max(0.0);
    let single_fee = 8.0 * packages as f64 + rng.gen_range(0.0..6.0);
    let two_batch_fee = single_fee * (1.0 + uplift);
    let actual_fee = single_fee * (1.0 + rng.gen_range(0.15..0.45));
    let delta = two_batch_fee - actual_fee;
    let unmet = u8::from(uplift > 0.07);
    let is_two_batch = u8::from(batches == 2 || (unmet == 0 && packages >= 2));
    let revenue = single_fee * rng.gen_range(6.0..15.0);

    vec![
        generate_order_id(rng),
        packages.to_string(),
        batches.to_string(),
        combo.to_string(),
        uplift_cell(uplift, args, rng),
        unmet.to_string(),
        fmt_money(delta),
        fmt_money(two_batch_fee),
        is_two_batch.to_string(),
        fmt_money(actual_fee),
        fmt_money(single_fee),
        if rng.gen_bool(0.01) { "-".to_string() } else { fmt_money(revenue) },
    ]
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Synthetic Order Generator");
    println!("{}", "━".repeat(60));
    println!("Output:           {}", args.output.display());
    println!("Orders:           {}", args.orders);
    println!("Duplicate rate:   {:.1}%", args.duplicate_rate * 100.0);
    println!("Placeholder rate: {:.1}%", args.placeholder_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let columns = ColumnNames::default();
    let mut writer = WriterBuilder::new().has_headers(false).from_path(&args.output)?;
    writer.write_record(columns.required().iter().chain(columns.impact().iter()))?;

    let mut rows_written = 0;
    for i in 0..args.orders {
        let row = generate_row(&args, &mut rng);
        writer.write_record(&row)?;
        rows_written += 1;
        if rng.gen::<f64>() < args.duplicate_rate {
            writer.write_record(&row)?;
            rows_written += 1;
        }

        if (i + 1) % 10000 == 0 {
            println!("   Generated {}/{} orders...", i + 1, args.orders);
        }
    }

    writer.flush()?;

    println!("Generation complete");
    println!("{}", "━".repeat(60));
    println!("Orders:        {:>8}", args.orders);
    println!("Rows written:  {:>8}", rows_written);
    println!("Output file:   {}", args.output.display());

    Ok(())
}
