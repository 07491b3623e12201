//! CSV loading
//!
//! Reads an order export into a `RawTable`. Each column is typed as a whole:
//! a column whose non-empty cells all parse as finite numbers yields
//! `Cell::Number`, any other column keeps its cells as `Cell::Text`. A
//! fraction column (`0.164`) therefore stays a fraction, while a column with
//! `%` suffixes or placeholder dashes is left for the normalizer to scale.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::models::{Cell, RawTable};

const UTF8_BOM: char = '\u{feff}';

/// Longest integer literal an `f64` holds exactly.
const MAX_EXACT_DIGITS: usize = 15;

/// Load a table from any CSV reader.
pub fn load_csv<R: Read>(reader: R) -> Result<RawTable, IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(UTF8_BOM).trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in csv_reader.records() {
        records.push(record?);
    }

    let width = records
        .iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .max(headers.len());
    let numeric: Vec<bool> = (0..width)
        .map(|col| {
            records
                .iter()
                .filter_map(|r| r.get(col))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .all(|v| numeric_value(v).is_some())
        })
        .collect();
    debug!(
        "Numeric columns: {:?}",
        headers
            .iter()
            .zip(&numeric)
            .filter(|&(_, &n)| n)
            .map(|(h, _)| h.as_str())
            .collect::<Vec<_>>()
    );

    let mut table = RawTable::new(headers);
    for record in &records {
        table.push_row(
            record
                .iter()
                .zip(&numeric)
                .map(|(value, &is_numeric)| typed_cell(value, is_numeric))
                .collect(),
        );
    }

    Ok(table)
}

/// A finite number that survives the trip through `f64` unchanged.
fn numeric_value(v: &str) -> Option<f64> {
    let digits = v.trim_start_matches(['+', '-']);
    if digits.len() > MAX_EXACT_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn typed_cell(value: &str, is_numeric: bool) -> Cell {
    if !is_numeric {
        return Cell::from(value);
    }
    match numeric_value(value.trim()) {
        Some(n) => Cell::Number(n),
        None => Cell::Empty,
    }
}

/// Load a table from a CSV file path.
pub fn load_csv_file(path: &Path) -> Result<RawTable, IngestError> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = load_csv(file)?;
    info!("Parsed {} rows from {:?}", table.rows.len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_with_bom_and_blanks() {
        let data = "\u{feff}销售订单号,包裹数\nSO1,3\nSO2,\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["销售订单号", "包裹数"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], Cell::Number(3.0));
        assert_eq!(table.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_column_types_are_inferred_per_column() {
        let data = "id,fraction,percent,dashed\n\
                    1,0.40,40%,0.1\n\
                    2,0.90,--,-\n\
                    3, ,12.5,0.2\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0][0], Cell::Number(1.0));
        assert_eq!(table.rows[0][1], Cell::Number(0.40));
        assert_eq!(table.rows[2][1], Cell::Empty);
        assert_eq!(table.rows[0][2], Cell::Text("40%".into()));
        assert_eq!(table.rows[2][2], Cell::Text("12.5".into()));
        assert_eq!(table.rows[0][3], Cell::Text("0.1".into()));
        assert_eq!(table.rows[1][3], Cell::Text("-".into()));
    }

    #[test]
    fn test_long_numeric_ids_stay_text() {
        let data = "id,n\n12345678901234567890,1\n12345678901234567891,2\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0][0], Cell::Text("12345678901234567890".into()));
        assert_eq!(table.rows[1][1], Cell::Number(2.0));
    }

    #[test]
    fn test_nan_and_inf_keep_column_textual() {
        let data = "x\n1.5\nnan\ninf\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0][0], Cell::Text("1.5".into()));
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv_file(Path::new("/nonexistent/orders.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
