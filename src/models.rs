use serde::Serialize;
use tracing::warn;

use crate::error::BacktestError;
use crate::normalize::{normalize, text_value, ColumnKind};
use crate::schema::{missing_columns, ColumnNames};

/// One raw input value, before any numeric interpretation
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Header row plus data rows, as delivered by whatever read the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Normalized order row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub package_count: Option<f64>,
    pub batch_count: Option<f64>,
    pub combination: String,
    /// Two-batch vs single-package cost uplift, as a fraction
    pub cost_uplift: Option<f64>,
    /// 1 when the order fails the current fixed threshold
    pub threshold_unmet: Option<f64>,
    /// Two-batch minus actual-batch last-mile fee
    pub cost_delta: Option<f64>,
    pub two_batch_fee: Option<f64>,
    #[serde(skip)]
    pub impact: Option<ImpactFields>,
}

/// Columns used only by the overall impact calculation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImpactFields {
    pub is_two_batch: Option<f64>,
    pub actual_fee: Option<f64>,
    pub single_package_fee: Option<f64>,
    pub revenue: Option<f64>,
}

/// Whether the optional impact columns were present in the input
#[derive(Debug, Clone, PartialEq)]
pub enum ImpactColumns {
    Available,
    Missing(Vec<String>),
}

/// The normalized dataset the engine runs on
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTable {
    pub records: Vec<OrderRecord>,
    pub impact_columns: ImpactColumns,
}

impl OrderTable {
    /// Validate the schema and normalize every row.
    ///
    /// Missing required columns abort with the full list of absent names.
    /// Missing impact columns only mark the impact summary as unavailable.
    /// Rows are never dropped; unreadable values become `None`.
    pub fn from_raw(raw: &RawTable, columns: &ColumnNames) -> Result<Self, BacktestError> {
        let missing = missing_columns(&raw.headers, &columns.required());
        if !missing.is_empty() {
            return Err(BacktestError::MissingColumns(missing));
        }

        let idx = |name: &str| raw.column_index(name);
        // Presence checked above
        let req = RequiredIdx {
            order_id: idx(&columns.order_id).unwrap_or_default(),
            package_count: idx(&columns.package_count).unwrap_or_default(),
            batch_count: idx(&columns.batch_count).unwrap_or_default(),
            combination: idx(&columns.combination).unwrap_or_default(),
            cost_uplift: idx(&columns.cost_uplift).unwrap_or_default(),
            threshold_unmet: idx(&columns.threshold_unmet).unwrap_or_default(),
            cost_delta: idx(&columns.cost_delta).unwrap_or_default(),
            two_batch_fee: idx(&columns.two_batch_fee).unwrap_or_default(),
        };

        let missing_impact = missing_columns(&raw.headers, &columns.impact());
        let impact_idx = if missing_impact.is_empty() {
            Some([
                idx(&columns.is_two_batch).unwrap_or_default(),
                idx(&columns.actual_fee).unwrap_or_default(),
                idx(&columns.single_package_fee).unwrap_or_default(),
                idx(&columns.revenue).unwrap_or_default(),
            ])
        } else {
            warn!(
                "Missing columns for overall impact: {:?} (impact summary will be unavailable)",
                missing_impact
            );
            None
        };

        let records = raw
            .rows
            .iter()
            .map(|row| {
                let cell = |i: usize| row.get(i).unwrap_or(&Cell::Empty);
                let plain = |i: usize| normalize(cell(i), ColumnKind::Plain);
                OrderRecord {
                    order_id: text_value(cell(req.order_id)),
                    package_count: plain(req.package_count),
                    batch_count: plain(req.batch_count),
                    combination: text_value(cell(req.combination)),
                    cost_uplift: normalize(cell(req.cost_uplift), ColumnKind::Percent),
                    threshold_unmet: plain(req.threshold_unmet),
                    cost_delta: plain(req.cost_delta),
                    two_batch_fee: plain(req.two_batch_fee),
                    impact: impact_idx.map(|[flag, actual, single, revenue]| ImpactFields {
                        is_two_batch: plain(flag),
                        actual_fee: plain(actual),
                        single_package_fee: plain(single),
                        revenue: plain(revenue),
                    }),
                }
            })
            .collect();

        Ok(Self {
            records,
            impact_columns: if missing_impact.is_empty() {
                ImpactColumns::Available
            } else {
                ImpactColumns::Missing(missing_impact)
            },
        })
    }
}

struct RequiredIdx {
    order_id: usize,
    package_count: usize,
    batch_count: usize,
    combination: usize,
    cost_uplift: usize,
    threshold_unmet: usize,
    cost_delta: usize,
    two_batch_fee: usize,
}
