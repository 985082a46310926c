//! Aggregators and per-level aggregation rules.

use std::fmt;
use std::str::FromStr;

use aerocol_tstype::TsType;
use serde::{Deserialize, Serialize};

use crate::error::ResampleError;

/// Aggregator applied to the valid samples of one output period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Aggregation {
    #[default]
    Mean,
    Median,
    Max,
    Min,
    Sum,
    /// Sample standard deviation.
    Std,
}

impl Aggregation {
    pub fn name(self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Sum => "sum",
            Aggregation::Std => "std",
        }
    }

    /// Aggregates `valid`, which holds only non-NaN samples. NaN if empty.
    pub fn apply(self, valid: &[f64]) -> f64 {
        let n = valid.len();
        if n == 0 {
            return f64::NAN;
        }
        match self {
            Aggregation::Mean => valid.iter().sum::<f64>() / n as f64,
            Aggregation::Median => {
                let mut sorted = valid.to_vec();
                sorted.sort_by(f64::total_cmp);
                if n % 2 == 1 {
                    sorted[n / 2]
                } else {
                    (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
                }
            }
            Aggregation::Max => valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => valid.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Sum => valid.iter().sum(),
            Aggregation::Std => {
                if n < 2 {
                    return f64::NAN;
                }
                let m = valid.iter().sum::<f64>() / n as f64;
                let ss: f64 = valid.iter().map(|v| (v - m) * (v - m)).sum();
                (ss / (n - 1) as f64).sqrt()
            }
        }
    }
}

impl FromStr for Aggregation {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            "max" => Ok(Aggregation::Max),
            "min" => Ok(Aggregation::Min),
            "sum" => Ok(Aggregation::Sum),
            "std" => Ok(Aggregation::Std),
            other => Err(ResampleError::UnknownAggregation {
                name: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Aggregation {
    type Error = ResampleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Aggregation> for String {
    fn from(value: Aggregation) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregator to use when going from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HowRule {
    pub from: TsType,
    pub to: TsType,
    pub how: Aggregation,
}

impl HowRule {
    pub fn new(from: TsType, to: TsType, how: Aggregation) -> Self {
        Self { from, to, how }
    }
}

/// Ordered aggregation rules; the first match for a `(from, to)` pair wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResampleHow {
    rules: Vec<HowRule>,
}

impl ResampleHow {
    pub fn new(rules: Vec<HowRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[HowRule] {
        &self.rules
    }

    pub fn lookup(&self, from: &TsType, to: &TsType) -> Option<Aggregation> {
        self.rules
            .iter()
            .find(|r| r.from == *from && r.to == *to)
            .map(|r| r.how)
    }

    /// Combines global rules with per-variable `overrides`, which win.
    pub fn overridden_by(&self, overrides: &ResampleHow) -> ResampleHow {
        let mut rules = overrides.rules.clone();
        rules.extend(self.rules.iter().copied());
        ResampleHow { rules }
    }
}
