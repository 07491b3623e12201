//! Shared request logic for the REST handlers

use thiserror::Error;
use tracing::info;

use crate::config::{BacktestConfig, SimulationParams};
use crate::error::{BacktestError, IngestError};
use crate::ingest::load_csv;
use crate::pipeline::{Backtest, BacktestReport};
use crate::schema::ColumnNames;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Backtest(#[from] BacktestError),
}

/// Holds the server-wide column mapping and default parameters
#[derive(Debug, Clone, Default)]
pub struct BacktestService {
    config: BacktestConfig,
}

impl BacktestService {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.config.columns
    }

    pub fn default_params(&self) -> SimulationParams {
        self.config.params
    }

    /// Parse a CSV body and run one backtest with `params`.
    pub fn run_csv(&self, body: &[u8], params: SimulationParams) -> Result<BacktestReport, ServiceError> {
        let engine = Backtest::new(self.config.columns.clone(), params)?;
        let raw = load_csv(body)?;
        info!("Backtest request: {} rows, sim threshold {}", raw.rows.len(), params.sim_threshold);
        Ok(engine.run_raw(&raw)?)
    }
}
