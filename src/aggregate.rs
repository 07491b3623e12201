//! Per-combination simulation statistics
//!
//! Groups the Blocked pool by provider combination and left-joins the
//! Unlocked pool onto it, so a combination that unlocks nothing still
//! shows up with zero unlocked orders.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, error};

use crate::models::OrderRecord;
use crate::recommend::Tier;
use crate::stats::{self, distinct_count, ratio};

const BATCH_DIST_SEPARATOR: &str = ",";

/// One row of the combination result table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboAggregate {
    pub combination: String,
    pub blocked_orders: usize,
    pub blocked_mean_uplift: Option<f64>,
    pub blocked_p90_uplift: Option<f64>,
    pub unlocked_orders: usize,
    pub unlocked_cost_delta_total: f64,
    pub unlocked_cost_delta_mean: Option<f64>,
    pub unlocked_p50_uplift: Option<f64>,
    pub unlocked_p90_uplift: Option<f64>,
    pub unlocked_p50_packages: Option<f64>,
    pub unlocked_batch_distribution: String,
    /// Unlocked / blocked; missing when blocked is 0
    pub unlock_ratio: Option<f64>,
    pub fixed_threshold: f64,
    pub sim_threshold: f64,
    /// The simulated threshold when it unlocks anything here
    pub suggested_threshold: Option<f64>,
    pub tier: Option<Tier>,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct BlockedStats {
    orders: usize,
    mean_uplift: Option<f64>,
    p90_uplift: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct UnlockedStats {
    orders: usize,
    cost_delta_total: f64,
    cost_delta_mean: Option<f64>,
    p50_uplift: Option<f64>,
    p90_uplift: Option<f64>,
    p50_packages: Option<f64>,
    batch_distribution: String,
}

/// Group orders by combination, keys in ascending order.
pub fn group_by_combination<'a>(
    orders: &[&'a OrderRecord],
) -> BTreeMap<&'a str, Vec<&'a OrderRecord>> {
    let mut groups: BTreeMap<&'a str, Vec<&'a OrderRecord>> = BTreeMap::new();
    for &order in orders {
        groups.entry(order.combination.as_str()).or_default().push(order);
    }
    groups
}

fn blocked_stats(group: &[&OrderRecord]) -> BlockedStats {
    let uplift = || group.iter().map(|o| o.cost_uplift);
    BlockedStats {
        orders: distinct_count(group.iter().map(|o| o.order_id.as_str())),
        mean_uplift: stats::mean(uplift()),
        p90_uplift: stats::percentile(uplift(), 90.0),
    }
}

fn unlocked_stats(group: &[&OrderRecord]) -> UnlockedStats {
    let uplift = || group.iter().map(|o| o.cost_uplift);
    let delta = || group.iter().map(|o| o.cost_delta);
    UnlockedStats {
        orders: distinct_count(group.iter().map(|o| o.order_id.as_str())),
        cost_delta_total: stats::sum(delta()),
        cost_delta_mean: stats::mean(delta()),
        p50_uplift: stats::median(uplift()),
        p90_uplift: stats::percentile(uplift(), 90.0),
        p50_packages: stats::median(group.iter().map(|o| o.package_count)),
        batch_distribution: batch_distribution(group),
    }
}

/// `"3batch:2,4batch:1"`: distinct orders per batch count, ascending.
pub fn batch_distribution(group: &[&OrderRecord]) -> String {
    let mut by_batch: BTreeMap<i64, BTreeSet<&str>> = BTreeMap::new();
    for order in group {
        if let Some(b) = order.batch_count {
            by_batch
                .entry(b.round() as i64)
                .or_default()
                .insert(order.order_id.as_str());
        }
    }
    by_batch
        .iter()
        .map(|(batches, ids)| format!("{}batch:{}", batches, ids.len()))
        .collect::<Vec<_>>()
        .join(BATCH_DIST_SEPARATOR)
}

/// Unlocked share of blocked orders; missing for an empty blocked count.
pub fn unlock_ratio(unlocked: usize, blocked: usize) -> Option<f64> {
    ratio(unlocked as f64, Some(blocked as f64))
}

/// Build the combination table from the Blocked and Unlocked pools.
pub fn aggregate(
    blocked: &[&OrderRecord],
    unlocked: &[&OrderRecord],
    fixed_threshold: f64,
    sim_threshold: f64,
) -> Vec<ComboAggregate> {
    let blocked_groups = group_by_combination(blocked);
    let mut unlocked_groups: BTreeMap<&str, UnlockedStats> = group_by_combination(unlocked)
        .into_iter()
        .map(|(combo, group)| (combo, unlocked_stats(&group)))
        .collect();

    let rows: Vec<ComboAggregate> = blocked_groups
        .into_iter()
        .map(|(combo, group)| {
            let b = blocked_stats(&group);
            let u = unlocked_groups.remove(combo).unwrap_or_default();
            debug!(
                "Combination {}: blocked={} unlocked={} delta_total={:.2}",
                combo, b.orders, u.orders, u.cost_delta_total
            );
            ComboAggregate {
                combination: combo.to_string(),
                blocked_orders: b.orders,
                blocked_mean_uplift: b.mean_uplift,
                blocked_p90_uplift: b.p90_uplift,
                unlocked_orders: u.orders,
                unlocked_cost_delta_total: u.cost_delta_total,
                unlocked_cost_delta_mean: u.cost_delta_mean,
                unlocked_p50_uplift: u.p50_uplift,
                unlocked_p90_uplift: u.p90_uplift,
                unlocked_p50_packages: u.p50_packages,
                unlocked_batch_distribution: u.batch_distribution,
                unlock_ratio: unlock_ratio(u.orders, b.orders),
                fixed_threshold,
                sim_threshold,
                suggested_threshold: (u.orders > 0).then_some(sim_threshold),
                tier: None,
                rationale: None,
            }
        })
        .collect();

    // Unlocked is a subset of Blocked, so every unlocked key was consumed above
    if !unlocked_groups.is_empty() {
        let orphans: Vec<&str> = unlocked_groups.keys().copied().collect();
        error!("Unlocked combinations missing from blocked pool: {:?}", orphans);
        debug_assert!(orphans.is_empty(), "unlocked combinations outside blocked pool");
    }

    rows
}
