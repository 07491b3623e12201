//! Backtest pipeline
//!
//! raw table -> normalize -> pools -> {aggregate, impact} -> recommend.
//! Every stage is a pure function of its inputs; running twice on the same
//! table and parameters yields identical reports.

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{aggregate, ComboAggregate};
use crate::config::{BacktestConfig, SimulationParams, FIXED_THRESHOLD};
use crate::error::BacktestError;
use crate::impact::{assess, ImpactOutcome};
use crate::models::{OrderRecord, OrderTable, RawTable};
use crate::pools::{classify, PoolCounts};
use crate::recommend::{recommend, Recommendation};
use crate::schema::ColumnNames;

/// Headline numbers of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub fixed_threshold: f64,
    pub sim_threshold: f64,
    pub orders: PoolCounts,
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub summary: RunSummary,
    /// Sorted by tier, then unlocked orders descending
    pub recommendations: Vec<Recommendation>,
    /// One row per blocked combination, ascending by combination
    pub combos: Vec<ComboAggregate>,
    pub impact: ImpactOutcome,
    /// The Unlocked pool, in input order
    pub unlocked: Vec<OrderRecord>,
}

impl BacktestReport {
    /// Unlocked orders of one combination.
    pub fn unlocked_for<'a>(&'a self, combination: &'a str) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        self.unlocked
            .iter()
            .filter(move |o| o.combination == combination)
    }

    /// Combination rows ordered by unlocked orders, largest first.
    pub fn combos_by_unlocked(&self) -> Vec<&ComboAggregate> {
        let mut rows: Vec<&ComboAggregate> = self.combos.iter().collect();
        rows.sort_by(|a, b| b.unlocked_orders.cmp(&a.unlocked_orders));
        rows
    }
}

/// A configured engine
#[derive(Debug, Clone)]
pub struct Backtest {
    columns: ColumnNames,
    params: SimulationParams,
}

impl Backtest {
    /// Build an engine; rejects out-of-range parameters.
    pub fn new(columns: ColumnNames, params: SimulationParams) -> Result<Self, BacktestError> {
        params.validate()?;
        Ok(Self { columns, params })
    }

    pub fn from_config(config: &BacktestConfig) -> Result<Self, BacktestError> {
        Self::new(config.columns.clone(), config.params)
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// Validate and normalize a raw table, then run.
    pub fn run_raw(&self, raw: &RawTable) -> Result<BacktestReport, BacktestError> {
        let table = OrderTable::from_raw(raw, &self.columns)?;
        Ok(self.run(&table))
    }

    /// Run on an already normalized table.
    pub fn run(&self, table: &OrderTable) -> BacktestReport {
        let params = &self.params;
        let pools = classify(&table.records, params.sim_threshold);
        let counts = pools.counts();
        info!(
            "Threshold {:.0}% -> {:.0}%: candidate={} blocked={} unlocked={}",
            FIXED_THRESHOLD * 100.0,
            params.sim_threshold * 100.0,
            counts.candidate,
            counts.blocked,
            counts.unlocked
        );

        let mut combos = aggregate(&pools.blocked, &pools.unlocked, FIXED_THRESHOLD, params.sim_threshold);
        let recommendations = recommend(&mut combos, params);
        info!("Built {} combination recommendations", recommendations.len());

        let impact = assess(table, &pools.unlocked);
        if let ImpactOutcome::Unavailable { missing_columns } = &impact {
            warn!("Overall impact unavailable, missing {:?}", missing_columns);
        }

        BacktestReport {
            summary: RunSummary {
                fixed_threshold: FIXED_THRESHOLD,
                sim_threshold: params.sim_threshold,
                orders: counts,
            },
            recommendations,
            combos,
            impact,
            unlocked: pools.unlocked.into_iter().cloned().collect(),
        }
    }
}
