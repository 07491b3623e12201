//! Fleet-wide before/after impact
//!
//! "Before" is the observed snapshot. "After" assumes every Unlocked order
//! switches to two-batch delivery and pays its cost delta.

use serde::Serialize;

use crate::models::{ImpactColumns, OrderRecord, OrderTable};
use crate::stats::{distinct_count, ratio, sum};

/// A metric computed on observed data and under the simulated unlocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricPair {
    pub before: Option<f64>,
    pub after: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallImpact {
    /// Share of distinct orders delivered in two batches
    pub two_batch_share: MetricPair,
    /// (actual fee - single-package fee) / single-package fee
    pub last_mile_uplift: MetricPair,
    /// (actual fee - single-package fee) / revenue
    pub cost_rate_gap: MetricPair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImpactOutcome {
    Available(OverallImpact),
    Unavailable { missing_columns: Vec<String> },
}

impl ImpactOutcome {
    pub fn available(&self) -> Option<&OverallImpact> {
        match self {
            ImpactOutcome::Available(impact) => Some(impact),
            ImpactOutcome::Unavailable { .. } => None,
        }
    }
}

/// Compute the impact summary, or report which columns prevent it.
pub fn assess(table: &OrderTable, unlocked: &[&OrderRecord]) -> ImpactOutcome {
    match &table.impact_columns {
        ImpactColumns::Available => ImpactOutcome::Available(overall_impact(&table.records, unlocked)),
        ImpactColumns::Missing(cols) => ImpactOutcome::Unavailable {
            missing_columns: cols.clone(),
        },
    }
}

pub fn overall_impact(records: &[OrderRecord], unlocked: &[&OrderRecord]) -> OverallImpact {
    let fields = || records.iter().filter_map(|o| o.impact.as_ref());

    let total_orders = distinct_count(records.iter().map(|o| o.order_id.as_str()));
    let two_batch_before = distinct_count(
        records
            .iter()
            .filter(|o| matches!(&o.impact, Some(f) if f.is_two_batch == Some(1.0)))
            .map(|o| o.order_id.as_str()),
    );
    let two_batch_after = two_batch_before + distinct_count(unlocked.iter().map(|o| o.order_id.as_str()));
    let total = (total_orders > 0).then_some(total_orders as f64);

    let actual_before = sum(fields().map(|f| f.actual_fee));
    let single_package = sum(fields().map(|f| f.single_package_fee));
    let revenue = sum(fields().map(|f| f.revenue));
    // An unreadable delta contributes zero rather than dropping the order's impact
    let unlocked_delta: f64 = unlocked.iter().map(|o| o.cost_delta.unwrap_or(0.0)).sum();
    let actual_after = actual_before + unlocked_delta;

    OverallImpact {
        two_batch_share: MetricPair {
            before: ratio(two_batch_before as f64, total),
            after: ratio(two_batch_after as f64, total),
        },
        last_mile_uplift: MetricPair {
            before: ratio(actual_before - single_package, Some(single_package)),
            after: ratio(actual_after - single_package, Some(single_package)),
        },
        cost_rate_gap: MetricPair {
            before: ratio(actual_before - single_package, Some(revenue)),
            after: ratio(actual_after - single_package, Some(revenue)),
        },
    }
}
