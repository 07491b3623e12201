//! Two-batch threshold backtest
//!
//! Simulates relaxing the two-batch cost-uplift threshold over an order-level
//! snapshot and recommends which provider combinations to apply it to first.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod impact;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod pools;
pub mod recommend;
pub mod report;
pub mod schema;
pub mod stats;

pub use config::{BacktestConfig, SimulationParams, FIXED_THRESHOLD};
pub use error::{BacktestError, IngestError};
pub use models::{Cell, OrderRecord, OrderTable, RawTable};
pub use pipeline::{Backtest, BacktestReport};
