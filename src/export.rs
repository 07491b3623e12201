//! CSV export of result tables
//!
//! Files start with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding for the Chinese provider names.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::models::OrderRecord;
use crate::pipeline::BacktestReport;

pub const COMBO_FILE: &str = "combo_simulation_result.csv";
pub const UNLOCKED_FILE: &str = "unlocked_order_detail.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One unlocked order with its impact columns laid out flat; blank when the
/// input had no impact columns.
#[derive(Debug, Serialize)]
pub struct UnlockedRow<'a> {
    pub order_id: &'a str,
    pub package_count: Option<f64>,
    pub batch_count: Option<f64>,
    pub combination: &'a str,
    pub cost_uplift: Option<f64>,
    pub threshold_unmet: Option<f64>,
    pub cost_delta: Option<f64>,
    pub two_batch_fee: Option<f64>,
    pub is_two_batch: Option<f64>,
    pub actual_fee: Option<f64>,
    pub single_package_fee: Option<f64>,
    pub revenue: Option<f64>,
}

impl<'a> From<&'a OrderRecord> for UnlockedRow<'a> {
    fn from(o: &'a OrderRecord) -> Self {
        let impact = o.impact.unwrap_or_default();
        Self {
            order_id: &o.order_id,
            package_count: o.package_count,
            batch_count: o.batch_count,
            combination: &o.combination,
            cost_uplift: o.cost_uplift,
            threshold_unmet: o.threshold_unmet,
            cost_delta: o.cost_delta,
            two_batch_fee: o.two_batch_fee,
            is_two_batch: impact.is_two_batch,
            actual_fee: impact.actual_fee,
            single_package_fee: impact.single_package_fee,
            revenue: impact.revenue,
        }
    }
}

/// Serialize rows as CSV with a leading BOM.
pub fn write_rows<W: Write, T: Serialize>(mut out: W, rows: &[T]) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the combination table and the unlocked order detail into `dir`.
pub fn export_report(report: &BacktestReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let combo_path = dir.join(COMBO_FILE);
    let file = std::fs::File::create(&combo_path)
        .with_context(|| format!("Failed to create {:?}", combo_path))?;
    write_rows(file, &report.combos)?;

    let unlocked_path = dir.join(UNLOCKED_FILE);
    let file = std::fs::File::create(&unlocked_path)
        .with_context(|| format!("Failed to create {:?}", unlocked_path))?;
    let rows: Vec<UnlockedRow> = report.unlocked.iter().map(UnlockedRow::from).collect();
    write_rows(file, &rows)?;

    info!("Exported {:?} and {:?}", combo_path, unlocked_path);
    Ok(vec![combo_path, unlocked_path])
}
