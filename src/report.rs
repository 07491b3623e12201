//! Console rendering of a backtest report

use crate::impact::{ImpactOutcome, MetricPair};
use crate::pipeline::BacktestReport;

const WIDTH: usize = 100;

pub fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(WIDTH));
    println!("  {}", title);
    println!("{}\n", "═".repeat(WIDTH));
}

pub fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(WIDTH - 10));
}

/// `12.34%`, or `-` when missing
pub fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v * 100.0))
}

/// Two decimals, or `-` when missing
pub fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn fmt_pair(pair: &MetricPair) -> String {
    format!("{} → {}", fmt_pct(pair.before), fmt_pct(pair.after))
}

/// Trim a label to `max_len` characters for table columns.
pub fn truncate(label: &str, max_len: usize) -> String {
    if label.chars().count() > max_len {
        let head: String = label.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

pub fn print_report(report: &BacktestReport, detail_combo: Option<&str>) {
    print_section_header("TWO-BATCH THRESHOLD BACKTEST");

    let s = &report.summary;
    println!("  Current threshold:    {:>10}", fmt_pct(Some(s.fixed_threshold)));
    println!("  Simulated threshold:  {:>10}", fmt_pct(Some(s.sim_threshold)));
    println!("  Candidate orders:     {:>10}", s.orders.candidate);
    println!("  Blocked orders:       {:>10}", s.orders.blocked);
    println!("  Unlocked orders:      {:>10}", s.orders.unlocked);

    print_subsection("Overall Impact (before → after)");
    match &report.impact {
        ImpactOutcome::Available(impact) => {
            println!("  Two-batch share:      {}", fmt_pair(&impact.two_batch_share));
            println!("  Last-mile uplift:     {}", fmt_pair(&impact.last_mile_uplift));
            println!("  Cost-rate gap:        {}", fmt_pair(&impact.cost_rate_gap));
        }
        ImpactOutcome::Unavailable { missing_columns } => {
            println!("  Unavailable, missing columns: {:?}", missing_columns);
        }
    }

    print_subsection("Recommendations");
    println!(
        "  {:4} {:28} {:>9} {:>12} {:>10}  {}",
        "Tier", "Combination", "Unlocked", "Delta Total", "Delta Avg", "Rationale"
    );
    for r in &report.recommendations {
        println!(
            "  {:4} {:28} {:>9} {:>12.2} {:>10}  {}",
            r.tier.to_string(),
            truncate(&r.combination, 28),
            r.unlocked_orders,
            r.unlocked_cost_delta_total,
            fmt_num(r.unlocked_cost_delta_mean),
            r.rationale
        );
    }

    print_subsection("Combination Simulation Result");
    println!(
        "  {:28} {:>8} {:>8} {:>8} {:>9} {:>9} {:>7}  {}",
        "Combination", "Blocked", "Unlocked", "Ratio", "P50 Upl", "P90 Upl", "P50 Pkg", "Batches"
    );
    for c in report.combos_by_unlocked() {
        println!(
            "  {:28} {:>8} {:>8} {:>8} {:>9} {:>9} {:>7}  {}",
            truncate(&c.combination, 28),
            c.blocked_orders,
            c.unlocked_orders,
            fmt_pct(c.unlock_ratio),
            fmt_pct(c.unlocked_p50_uplift),
            fmt_pct(c.unlocked_p90_uplift),
            fmt_num(c.unlocked_p50_packages),
            c.unlocked_batch_distribution
        );
    }

    if let Some(combo) = detail_combo {
        print_subsection(&format!("Unlocked Orders: {}", combo));
        println!(
            "  {:20} {:>8} {:>8} {:>10} {:>12} {:>12}",
            "Order", "Pkgs", "Batches", "Uplift", "Delta", "2-Batch Fee"
        );
        for o in report.unlocked_for(combo) {
            println!(
                "  {:20} {:>8} {:>8} {:>10} {:>12} {:>12}",
                truncate(&o.order_id, 20),
                fmt_num(o.package_count),
                fmt_num(o.batch_count),
                fmt_pct(o.cost_uplift),
                fmt_num(o.cost_delta),
                fmt_num(o.two_batch_fee)
            );
        }
    }

    println!("\n{}", "═".repeat(WIDTH));
}
