//! Tiered recommendations per provider combination
//!
//! Tiers come from an ordered rule table; the first matching rule wins.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::aggregate::ComboAggregate;
use crate::config::SimulationParams;

/// Recommendation strength. Orders P0 < P1 < P2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    /// Apply first: cheap and low tail risk
    P0,
    /// Conditional: some benefit, but cost or tail risk is above the P0 bar
    P1,
    /// Not recommended: too little evidence or nothing unlocks
    P2,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::P0 => "P0",
            Tier::P1 => "P1",
            Tier::P2 => "P2",
        };
        f.write_str(s)
    }
}

struct TierRule {
    name: &'static str,
    tier: Tier,
    applies: fn(&ComboAggregate, &SimulationParams) -> bool,
}

fn too_few_samples(row: &ComboAggregate, params: &SimulationParams) -> bool {
    row.blocked_orders < params.min_combo_orders as usize
}

fn nothing_unlocks(row: &ComboAggregate, _: &SimulationParams) -> bool {
    row.unlocked_orders == 0
}

fn cheap_and_low_tail(row: &ComboAggregate, params: &SimulationParams) -> bool {
    matches!(row.unlocked_cost_delta_mean, Some(d) if d <= params.max_avg_delta)
        && matches!(row.unlocked_p90_uplift, Some(p) if p <= params.p90_uplift_cap)
}

fn always(_: &ComboAggregate, _: &SimulationParams) -> bool {
    true
}

const TIER_RULES: &[TierRule] = &[
    TierRule { name: "insufficient-sample", tier: Tier::P2, applies: too_few_samples },
    TierRule { name: "no-unlock", tier: Tier::P2, applies: nothing_unlocks },
    TierRule { name: "cheap-low-tail", tier: Tier::P0, applies: cheap_and_low_tail },
    TierRule { name: "some-benefit", tier: Tier::P1, applies: always },
];

/// Tier for one combination row.
pub fn judge_tier(row: &ComboAggregate, params: &SimulationParams) -> Tier {
    matching_rule(row, params).tier
}

/// Name of the rule that decided the tier, for diagnostics.
pub fn deciding_rule(row: &ComboAggregate, params: &SimulationParams) -> &'static str {
    matching_rule(row, params).name
}

fn matching_rule(row: &ComboAggregate, params: &SimulationParams) -> &'static TierRule {
    TIER_RULES
        .iter()
        .find(|rule| (rule.applies)(row, params))
        .unwrap_or(&TIER_RULES[TIER_RULES.len() - 1])
}

/// One-sentence justification for a combination row.
pub fn rationale(row: &ComboAggregate, sim_threshold: f64) -> String {
    if row.unlocked_orders == 0 {
        return "No orders unlock at the simulated threshold".to_string();
    }
    format!(
        "At a {}% threshold {} orders unlock, total cost delta {:.2}, mean {:.2}, P90 cost uplift {:.1}%",
        (sim_threshold * 100.0).round() as i64,
        row.unlocked_orders,
        row.unlocked_cost_delta_total,
        row.unlocked_cost_delta_mean.unwrap_or(0.0),
        row.unlocked_p90_uplift.map(|p| p * 100.0).unwrap_or(0.0),
    )
}

/// A row of the recommendation table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub combination: String,
    pub fixed_threshold: f64,
    pub suggested_threshold: Option<f64>,
    pub unlocked_orders: usize,
    pub unlocked_cost_delta_total: f64,
    pub unlocked_cost_delta_mean: Option<f64>,
    pub tier: Tier,
    pub rationale: String,
}

/// Attach tier and rationale to every row, then project and sort the
/// recommendation table: tier ascending, unlocked orders descending.
pub fn recommend(rows: &mut [ComboAggregate], params: &SimulationParams) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = rows
        .iter_mut()
        .map(|row| {
            let tier = judge_tier(row, params);
            debug!("{} -> {} ({})", row.combination, tier, deciding_rule(row, params));
            let reason = rationale(row, params.sim_threshold);
            row.tier = Some(tier);
            row.rationale = Some(reason.clone());
            Recommendation {
                combination: row.combination.clone(),
                fixed_threshold: row.fixed_threshold,
                suggested_threshold: row.suggested_threshold,
                unlocked_orders: row.unlocked_orders,
                unlocked_cost_delta_total: row.unlocked_cost_delta_total,
                unlocked_cost_delta_mean: row.unlocked_cost_delta_mean,
                tier,
                rationale: reason,
            }
        })
        .collect();

    recs.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then_with(|| b.unlocked_orders.cmp(&a.unlocked_orders))
    });
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(combo: &str, blocked: usize, unlocked: usize, mean: Option<f64>, p90: Option<f64>) -> ComboAggregate {
        ComboAggregate {
            combination: combo.into(),
            blocked_orders: blocked,
            blocked_mean_uplift: None,
            blocked_p90_uplift: None,
            unlocked_orders: unlocked,
            unlocked_cost_delta_total: mean.unwrap_or(0.0) * unlocked as f64,
            unlocked_cost_delta_mean: mean,
            unlocked_p50_uplift: p90,
            unlocked_p90_uplift: p90,
            unlocked_p50_packages: None,
            unlocked_batch_distribution: String::new(),
            unlock_ratio: None,
            fixed_threshold: 0.07,
            sim_threshold: 0.15,
            suggested_threshold: (unlocked > 0).then_some(0.15),
            tier: None,
            rationale: None,
        }
    }

    #[test]
    fn test_cheap_low_tail_is_p0() {
        let r = row("A", 5, 5, Some(10.0), Some(0.05));
        assert_eq!(judge_tier(&r, &SimulationParams::default()), Tier::P0);
    }

    #[test]
    fn test_p0_caps_are_inclusive() {
        let r = row("A", 5, 5, Some(50.0), Some(0.18));
        assert_eq!(judge_tier(&r, &SimulationParams::default()), Tier::P0);
        assert_eq!(deciding_rule(&r, &SimulationParams::default()), "cheap-low-tail");
    }

    #[test]
    fn test_expensive_is_p1() {
        let r = row("A", 5, 5, Some(80.0), Some(0.05));
        assert_eq!(judge_tier(&r, &SimulationParams::default()), Tier::P1);
    }

    #[test]
    fn test_high_tail_is_p1() {
        let r = row("A", 5, 5, Some(10.0), Some(0.20));
        assert_eq!(judge_tier(&r, &SimulationParams::default()), Tier::P1);
    }

    #[test]
    fn test_missing_mean_is_p1() {
        let r = row("A", 5, 5, None, Some(0.05));
        assert_eq!(judge_tier(&r, &SimulationParams::default()), Tier::P1);
    }

    #[test]
    fn test_small_sample_beats_p0() {
        let params = SimulationParams { min_combo_orders: 10, ..Default::default() };
        let r = row("A", 5, 5, Some(10.0), Some(0.05));
        assert_eq!(judge_tier(&r, &params), Tier::P2);
        assert_eq!(deciding_rule(&r, &params), "insufficient-sample");
    }

    #[test]
    fn test_nothing_unlocks_is_p2() {
        let r = row("A", 5, 0, None, None);
        assert_eq!(judge_tier(&r, &SimulationParams::default()), Tier::P2);
        assert_eq!(rationale(&r, 0.15), "No orders unlock at the simulated threshold");
    }

    #[test]
    fn test_rationale_text() {
        let r = row("A", 5, 4, Some(12.5), Some(0.123));
        assert_eq!(
            rationale(&r, 0.15),
            "At a 15% threshold 4 orders unlock, total cost delta 50.00, mean 12.50, P90 cost uplift 12.3%"
        );
    }

    #[test]
    fn test_sorting() {
        let mut rows = vec![
            row("none", 3, 0, None, None),
            row("p1-small", 3, 1, Some(90.0), Some(0.1)),
            row("p0", 3, 2, Some(1.0), Some(0.1)),
            row("p1-big", 9, 6, Some(90.0), Some(0.1)),
        ];
        let recs = recommend(&mut rows, &SimulationParams::default());
        let order: Vec<&str> = recs.iter().map(|r| r.combination.as_str()).collect();
        assert_eq!(order, vec!["p0", "p1-big", "p1-small", "none"]);
        assert!(rows.iter().all(|r| r.tier.is_some() && r.rationale.is_some()));
    }
}
