//! Value normalization
//!
//! Coerces raw cells into numbers or an explicit missing marker (`None`).
//! Never fails and never substitutes zero for an unreadable value.

use crate::models::Cell;

/// Tokens that exports use for "no data". Compared after trimming and lowercasing.
const PLACEHOLDER_TOKENS: &[&str] = &["", "-", "--", "–", "—", "none", "nan"];

/// Numeric semantics declared for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Text holds percentage points (`"16.40%"` or `"16.4"`); numbers are already fractions.
    Percent,
    /// Plain numeric value.
    Plain,
}

pub fn normalize(cell: &Cell, kind: ColumnKind) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => n.is_finite().then_some(*n),
        Cell::Text(s) => parse_text(s, kind),
    }
}

fn parse_text(raw: &str, kind: ColumnKind) -> Option<f64> {
    let trimmed = raw.trim();
    if is_placeholder(trimmed) {
        return None;
    }

    match kind {
        ColumnKind::Percent => {
            let body = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            parse_finite(body).map(|v| v / 100.0)
        }
        ColumnKind::Plain => parse_finite(trimmed),
    }
}

fn is_placeholder(s: &str) -> bool {
    let lower = s.to_lowercase();
    PLACEHOLDER_TOKENS.contains(&lower.as_str())
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render an identifier cell as a stable grouping key.
pub fn text_value(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
            format!("{}", *n as i64)
        }
        Cell::Number(n) => n.to_string(),
    }
}
