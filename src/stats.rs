//! Reducers over numeric series
//!
//! Every reducer ignores missing values. Reducers that have no meaningful
//! value on an empty series return `None`.

use std::collections::BTreeSet;

/// Present values of a series.
pub fn present<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().collect()
}

/// Sum of present values; zero for an empty series.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let v = present(values);
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

/// Percentile `q` in [0, 100], linear interpolation between closest ranks.
pub fn percentile<I>(values: I, q: f64) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut v = present(values);
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (v.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(v[lo] + (v[hi] - v[lo]) * frac)
}

pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    percentile(values, 50.0)
}

/// Number of distinct keys.
pub fn distinct_count<'a, I>(keys: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter().collect::<BTreeSet<_>>().len()
}

/// `num / den`, missing when the denominator is zero, missing, or the result is not finite.
pub fn ratio(num: f64, den: Option<f64>) -> Option<f64> {
    match den {
        Some(d) if d != 0.0 => Some(num / d).filter(|r| r.is_finite()),
        _ => None,
    }
}
