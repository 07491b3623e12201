//! Run parameters and configuration file loading

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::BacktestError;
use crate::schema::ColumnNames;

/// Current system threshold for two-batch cost uplift. Not tunable.
pub const FIXED_THRESHOLD: f64 = 0.07;
/// Upper bound for the simulated threshold.
pub const MAX_SIM_THRESHOLD: f64 = 0.25;
/// Bounds for the P0 P90-uplift cap.
pub const MIN_P90_UPLIFT_CAP: f64 = 0.07;
pub const MAX_P90_UPLIFT_CAP: f64 = 0.50;

/// Scalar inputs of one backtest run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Relaxed threshold to simulate, as a fraction
    pub sim_threshold: f64,
    /// Combinations with fewer blocked orders are never recommended
    pub min_combo_orders: u32,
    /// P0 cap on mean per-order cost delta (local currency)
    pub max_avg_delta: f64,
    /// P0 cap on P90 cost uplift of unlocked orders, as a fraction
    pub p90_uplift_cap: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            sim_threshold: 0.15,
            min_combo_orders: 1,
            max_avg_delta: 50.0,
            p90_uplift_cap: 0.18,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), BacktestError> {
        let invalid = |name: &'static str, reason: String| {
            Err(BacktestError::InvalidParameter { name, reason })
        };

        if !(FIXED_THRESHOLD..=MAX_SIM_THRESHOLD).contains(&self.sim_threshold) {
            return invalid(
                "sim_threshold",
                format!(
                    "{} is outside [{}, {}]",
                    self.sim_threshold, FIXED_THRESHOLD, MAX_SIM_THRESHOLD
                ),
            );
        }
        if self.min_combo_orders < 1 {
            return invalid("min_combo_orders", "must be at least 1".into());
        }
        if !self.max_avg_delta.is_finite() || self.max_avg_delta < 0.0 {
            return invalid(
                "max_avg_delta",
                format!("{} is not a non-negative amount", self.max_avg_delta),
            );
        }
        if !(MIN_P90_UPLIFT_CAP..=MAX_P90_UPLIFT_CAP).contains(&self.p90_uplift_cap) {
            return invalid(
                "p90_uplift_cap",
                format!(
                    "{} is outside [{}, {}]",
                    self.p90_uplift_cap, MIN_P90_UPLIFT_CAP, MAX_P90_UPLIFT_CAP
                ),
            );
        }
        Ok(())
    }
}

/// Everything a host needs to run the engine: column names and parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub columns: ColumnNames,
    pub params: SimulationParams,
}

impl BacktestConfig {
    /// Load from a JSON file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }
}
