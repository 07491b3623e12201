use two_batch_backtest::aggregate::{aggregate, unlock_ratio};
use two_batch_backtest::impact::ImpactOutcome;
use two_batch_backtest::ingest::load_csv;
use two_batch_backtest::normalize::{normalize, ColumnKind};
use two_batch_backtest::recommend::{judge_tier, Tier};
use two_batch_backtest::schema::ColumnNames;
use two_batch_backtest::{Backtest, Cell, OrderRecord, RawTable, SimulationParams};

struct Row<'a> {
    id: &'a str,
    packages: &'a str,
    batches: &'a str,
    combo: &'a str,
    uplift: &'a str,
    unmet: &'a str,
    delta: &'a str,
}

fn table(rows: &[Row], with_impact: bool) -> RawTable {
    let cols = ColumnNames::default();
    let mut headers: Vec<String> = cols.required().iter().map(|s| s.to_string()).collect();
    if with_impact {
        headers.extend(cols.impact().iter().map(|s| s.to_string()));
    }
    let mut t = RawTable::new(headers);
    for r in rows {
        let mut cells: Vec<Cell> = [r.id, r.packages, r.batches, r.combo, r.uplift, r.unmet, r.delta, "30"]
            .iter()
            .map(|s| Cell::from(*s))
            .collect();
        if with_impact {
            cells.extend(["0", "100", "80", "1000"].iter().map(|s| Cell::from(*s)));
        }
        t.push_row(cells);
    }
    t
}

fn row<'a>(id: &'a str, combo: &'a str, uplift: &'a str) -> Row<'a> {
    Row { id, packages: "4", batches: "3", combo, uplift, unmet: "1", delta: "5" }
}

fn sample() -> RawTable {
    table(
        &[
            row("1", "A", "8%"),
            row("2", "A", "11%"),
            row("3", "A", "19%"),
            row("4", "B", "--"),
            row("5", "B", "24.5%"),
            row("5", "B", "24.5%"),
            row("6", "C", "13%"),
            Row { id: "7", packages: "2", batches: "3", combo: "C", uplift: "9%", unmet: "1", delta: "5" },
            Row { id: "8", packages: "3", batches: "3", combo: "C", uplift: "9%", unmet: "0", delta: "5" },
        ],
        true,
    )
}

fn engine(sim: f64) -> Backtest {
    let params = SimulationParams { sim_threshold: sim, ..Default::default() };
    Backtest::new(ColumnNames::default(), params).unwrap()
}

#[test]
fn unlocked_within_blocked_within_candidate() {
    let report = engine(0.15).run_raw(&sample()).unwrap();
    let c = report.summary.orders;
    assert!(c.unlocked <= c.blocked && c.blocked <= c.candidate);
    assert_eq!((c.candidate, c.blocked, c.unlocked), (7, 6, 3));
    for o in &report.unlocked {
        assert!(o.cost_uplift.unwrap() <= 0.15);
        assert_eq!(o.threshold_unmet, Some(1.0));
    }
}

#[test]
fn unlocked_grows_with_threshold() {
    let raw = sample();
    let mut last = 0;
    for pct in 7..=25 {
        let n = engine(pct as f64 / 100.0).run_raw(&raw).unwrap().summary.orders.unlocked;
        assert!(n >= last, "unlocked shrank at {}%", pct);
        last = n;
    }
}

#[test]
fn missing_uplift_never_unlocks() {
    let report = engine(0.25).run_raw(&sample()).unwrap();
    assert!(report.unlocked.iter().all(|o| o.order_id != "4"));
}

#[test]
fn unlocked_never_exceeds_blocked_per_combination() {
    let report = engine(0.25).run_raw(&sample()).unwrap();
    for c in &report.combos {
        assert!(c.unlocked_orders <= c.blocked_orders);
    }
    let b = report.combos.iter().find(|c| c.combination == "B").unwrap();
    assert_eq!(b.blocked_orders, 2);
    assert_eq!(b.unlocked_orders, 1);
}

#[test]
fn rerun_is_identical() {
    let raw = sample();
    let first = serde_json::to_string(&engine(0.15).run_raw(&raw).unwrap()).unwrap();
    let second = serde_json::to_string(&engine(0.15).run_raw(&raw).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn impact_is_computed_when_columns_present() {
    let report = engine(0.15).run_raw(&sample()).unwrap();
    let impact = report.impact.available().unwrap();
    // 8 distinct orders, none two-batch; 3 unlocked
    assert_eq!(impact.two_batch_share.before, Some(0.0));
    assert_eq!(impact.two_batch_share.after, Some(3.0 / 8.0));
}

#[test]
fn scenario_a_no_candidates() {
    let rows: Vec<Row> = (0..10)
        .map(|_| Row { id: "x", packages: "1", batches: "1", combo: "A", uplift: "5%", unmet: "1", delta: "1" })
        .collect();
    let report = engine(0.15).run_raw(&table(&rows, false)).unwrap();
    assert_eq!(report.summary.orders.candidate, 0);
    assert!(report.combos.is_empty());
    assert!(report.recommendations.is_empty());
    assert!(report.unlocked.is_empty());
    assert!(matches!(report.impact, ImpactOutcome::Unavailable { .. }));
}

#[test]
fn scenario_b_and_c_tiers() {
    let rows: Vec<Row> = ["1", "2", "3", "4", "5"]
        .iter()
        .map(|&id| Row { id, packages: "3", batches: "3", combo: "A", uplift: "5%", unmet: "1", delta: "10" })
        .collect();
    let report = engine(0.15).run_raw(&table(&rows, false)).unwrap();
    let combo = &report.combos[0];
    assert_eq!((combo.blocked_orders, combo.unlocked_orders), (5, 5));
    assert_eq!(combo.unlocked_cost_delta_mean, Some(10.0));
    assert_eq!(combo.tier, Some(Tier::P0));

    let mut expensive = combo.clone();
    expensive.unlocked_cost_delta_mean = Some(80.0);
    assert_eq!(judge_tier(&expensive, &SimulationParams::default()), Tier::P1);
}

fn blocked_order(id: &str, combo: &str, uplift: f64) -> OrderRecord {
    OrderRecord {
        order_id: id.into(),
        package_count: Some(3.0),
        batch_count: Some(3.0),
        combination: combo.into(),
        cost_uplift: Some(uplift),
        threshold_unmet: Some(1.0),
        cost_delta: Some(2.0),
        two_batch_fee: Some(20.0),
        impact: None,
    }
}

#[test]
fn scenario_d_zero_blocked_ratio() {
    assert_eq!(unlock_ratio(0, 0), None);
    assert!(aggregate(&[], &[], 0.07, 0.15).is_empty());
}

// An unlocked combination with no blocked rows is never turned into a row;
// debug builds additionally trip the subset assertion.
#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "unlocked combinations outside blocked pool"))]
fn unlocked_combination_outside_blocked_adds_no_row() {
    let kept = blocked_order("1", "A", 0.10);
    let orphan = blocked_order("2", "Z", 0.10);
    let rows = aggregate(&[&kept], &[&kept, &orphan], 0.07, 0.15);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].combination, "A");
    assert_eq!(rows[0].unlocked_orders, 1);
}

fn csv_with(rows: &[&str]) -> String {
    let mut csv = ColumnNames::default().required().join(",");
    for r in rows {
        csv.push('\n');
        csv.push_str(r);
    }
    csv.push('\n');
    csv
}

#[test]
fn fraction_uplift_column_is_not_rescaled() {
    let csv = csv_with(&["SO1,3,3,A,0.40,1,4,20", "SO2,3,3,A,0.90,1,4,20"]);
    let report = engine(0.15).run_raw(&load_csv(csv.as_bytes()).unwrap()).unwrap();
    assert_eq!(report.summary.orders.blocked, 2);
    assert_eq!(report.summary.orders.unlocked, 0);
    assert!((report.combos[0].blocked_mean_uplift.unwrap() - 0.65).abs() < 1e-12);
}

#[test]
fn percent_uplift_column_with_placeholders_is_rescaled() {
    let csv = csv_with(&[
        "SO1,3,3,A,12%,1,4,20",
        "SO2,3,3,A,--,1,4,20",
        "SO3,3,3,A,9,1,4,20",
        "SO4,3,3,A,40,1,4,20",
    ]);
    let report = engine(0.15).run_raw(&load_csv(csv.as_bytes()).unwrap()).unwrap();
    assert_eq!(report.summary.orders.blocked, 4);
    assert_eq!(report.summary.orders.unlocked, 2);
    let ids: Vec<&str> = report.unlocked.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["SO1", "SO3"]);
}

#[test]
fn scenario_e_normalization() {
    let text = |s: &str| Cell::Text(s.to_string());
    assert!((normalize(&text("16.40%"), ColumnKind::Percent).unwrap() - 0.164).abs() < 1e-12);
    assert_eq!(normalize(&text("--"), ColumnKind::Percent), None);
    assert_eq!(normalize(&text("-5"), ColumnKind::Percent), Some(-0.05));
    assert_eq!(normalize(&text("-5"), ColumnKind::Plain), Some(-5.0));
}

#[test]
fn missing_required_column_is_reported() {
    let raw = RawTable::new(vec!["销售订单号".to_string()]);
    let err = engine(0.15).run_raw(&raw).unwrap_err();
    assert!(err.to_string().contains("包裹数"));
}
