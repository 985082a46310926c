//! NaN-aware descriptive helpers and the mean/median aggregator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Mean of the finite values in `data`. NaN if there are none.
pub fn nanmean(data: &[f64]) -> f64 {
    let (sum, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), &x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Median of the finite values in `data`. NaN if there are none.
///
/// For even counts the two middle values are averaged.
pub fn nanmedian(data: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Weighted mean. Weights of `None` count every element once.
pub(crate) fn weighted_mean(x: &[f64], w: Option<&[f64]>) -> f64 {
    match w {
        Some(w) => {
            let sw: f64 = w.iter().sum();
            x.iter().zip(w).map(|(a, b)| a * b).sum::<f64>() / sw
        }
        None => x.iter().sum::<f64>() / x.len() as f64,
    }
}

/// Weighted population standard deviation.
pub(crate) fn weighted_std(x: &[f64], w: Option<&[f64]>) -> f64 {
    let m = weighted_mean(x, w);
    let sq: Vec<f64> = x.iter().map(|v| (v - m) * (v - m)).collect();
    weighted_mean(&sq, w).sqrt()
}

/// Collapse method used by temporal and spatial statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    Mean,
    Median,
}

impl Aggregate {
    /// Aggregates the finite values in `data`, NaN if none remain.
    pub fn apply(self, data: &[f64]) -> f64 {
        match self {
            Aggregate::Mean => nanmean(data),
            Aggregate::Median => nanmedian(data),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
        }
    }
}

impl FromStr for Aggregate {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Aggregate::Mean),
            "median" => Ok(Aggregate::Median),
            other => Err(StatsError::InvalidAggregation {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
