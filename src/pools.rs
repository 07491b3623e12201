//! Pool classification
//!
//! Candidate: package count >= 3 and delivery batches >= 3.
//! Blocked: candidates failing the fixed threshold (flag == 1).
//! Unlocked: blocked orders whose uplift is within the simulated threshold.
//! Any comparison against a missing value is false.

use serde::Serialize;

use crate::models::OrderRecord;
use crate::stats::distinct_count;

const MIN_PACKAGES: f64 = 3.0;
const MIN_BATCHES: f64 = 3.0;

/// Borrowed views over one order table
#[derive(Debug, Clone)]
pub struct Pools<'a> {
    pub candidate: Vec<&'a OrderRecord>,
    pub blocked: Vec<&'a OrderRecord>,
    pub unlocked: Vec<&'a OrderRecord>,
}

/// Distinct-order counts of each pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub candidate: usize,
    pub blocked: usize,
    pub unlocked: usize,
}

pub fn is_candidate(order: &OrderRecord) -> bool {
    matches!(order.package_count, Some(p) if p >= MIN_PACKAGES)
        && matches!(order.batch_count, Some(b) if b >= MIN_BATCHES)
}

pub fn is_blocked(order: &OrderRecord) -> bool {
    is_candidate(order) && order.threshold_unmet == Some(1.0)
}

/// Only meaningful for blocked orders; a missing uplift never unlocks.
pub fn unlocks_at(order: &OrderRecord, sim_threshold: f64) -> bool {
    matches!(order.cost_uplift, Some(u) if u <= sim_threshold)
}

pub fn classify(records: &[OrderRecord], sim_threshold: f64) -> Pools<'_> {
    let candidate: Vec<&OrderRecord> = records.iter().filter(|o| is_candidate(o)).collect();
    let blocked: Vec<&OrderRecord> = candidate
        .iter()
        .copied()
        .filter(|o| is_blocked(o))
        .collect();
    let unlocked: Vec<&OrderRecord> = blocked
        .iter()
        .copied()
        .filter(|o| unlocks_at(o, sim_threshold))
        .collect();

    Pools {
        candidate,
        blocked,
        unlocked,
    }
}

impl Pools<'_> {
    pub fn counts(&self) -> PoolCounts {
        let ids = |pool: &[&OrderRecord]| distinct_count(pool.iter().map(|o| o.order_id.as_str()));
        PoolCounts {
            candidate: ids(&self.candidate),
            blocked: ids(&self.blocked),
            unlocked: ids(&self.unlocked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, pkgs: f64, batches: f64, unmet: f64, uplift: Option<f64>) -> OrderRecord {
        OrderRecord {
            order_id: id.into(),
            package_count: Some(pkgs),
            batch_count: Some(batches),
            combination: "A+B".into(),
            cost_uplift: uplift,
            threshold_unmet: Some(unmet),
            cost_delta: Some(1.0),
            two_batch_fee: Some(10.0),
            impact: None,
        }
    }

    #[test]
    fn test_candidate_boundaries() {
        assert!(is_candidate(&order("1", 3.0, 3.0, 0.0, None)));
        assert!(!is_candidate(&order("2", 2.0, 3.0, 0.0, None)));
        assert!(!is_candidate(&order("3", 3.0, 2.0, 0.0, None)));
        let mut missing = order("4", 3.0, 3.0, 0.0, None);
        missing.package_count = None;
        assert!(!is_candidate(&missing));
    }

    #[test]
    fn test_pools_nest() {
        let records = vec![
            order("1", 3.0, 3.0, 1.0, Some(0.10)),
            order("2", 4.0, 3.0, 1.0, Some(0.20)),
            order("3", 3.0, 4.0, 0.0, Some(0.05)),
            order("4", 1.0, 1.0, 1.0, Some(0.05)),
            order("5", 3.0, 3.0, 1.0, None),
        ];
        let pools = classify(&records, 0.15);
        assert_eq!(pools.counts(), PoolCounts { candidate: 4, blocked: 3, unlocked: 1 });
        assert_eq!(pools.unlocked[0].order_id, "1");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let records = vec![order("1", 3.0, 3.0, 1.0, Some(0.15))];
        assert_eq!(classify(&records, 0.15).unlocked.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_count_once() {
        let records = vec![
            order("1", 3.0, 3.0, 1.0, Some(0.10)),
            order("1", 3.0, 3.0, 1.0, Some(0.10)),
        ];
        let pools = classify(&records, 0.15);
        assert_eq!(pools.unlocked.len(), 2);
        assert_eq!(pools.counts().unlocked, 1);
    }
}
