//! Scalar reducers that collapse a list of attribute values to one number.

use crate::error::OverlapError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Reducer applied to the values mapping onto one universe row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Mean,
    Median,
    Max,
    Min,
    /// Sample standard deviation (n - 1 denominator).
    Sd,
}

impl Reducer {
    /// Collapse `values` to a scalar.
    ///
    /// Returns `None` for empty input, and for `Sd` with fewer than two values.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Reducer::Mean => Some(mean(values)),
            Reducer::Median => quantile(values, 0.5),
            Reducer::Max => values.iter().copied().reduce(f64::max),
            Reducer::Min => values.iter().copied().reduce(f64::min),
            Reducer::Sd => {
                if values.len() < 2 {
                    return None;
                }
                let m = mean(values);
                let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
                Some((ss / (values.len() - 1) as f64).sqrt())
            }
        }
    }
}

impl FromStr for Reducer {
    type Err = OverlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Reducer::Mean),
            "median" => Ok(Reducer::Median),
            "max" => Ok(Reducer::Max),
            "min" => Ok(Reducer::Min),
            "sd" | "standard-deviation" | "stddev" => Ok(Reducer::Sd),
            _ => Err(OverlapError::config(format!(
                "Unknown reducer '{}'. Use: mean, median, max, min, sd",
                s
            ))),
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reducer::Mean => "mean",
            Reducer::Median => "median",
            Reducer::Max => "max",
            Reducer::Min => "min",
            Reducer::Sd => "sd",
        };
        f.write_str(name)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolation quantile (Hyndman-Fan type 7).
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}
