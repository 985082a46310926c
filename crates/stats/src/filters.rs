//! Pre-filters on paired data and post-filters on results.

use crate::dict::StatsDict;

/// Selects which `(data, ref_data)` pairs enter a calculation.
pub trait DataFilter {
    /// `true` for every index that is kept.
    fn mask(&self, data: &[f64], ref_data: &[f64]) -> Vec<bool>;

    /// Applies [`mask`](DataFilter::mask) to the paired arrays and weights.
    fn apply(
        &self,
        data: &[f64],
        ref_data: &[f64],
        weights: Option<&[f64]>,
    ) -> (Vec<f64>, Vec<f64>, Option<Vec<f64>>) {
        let keep = self.mask(data, ref_data);
        let pick = |v: &[f64]| -> Vec<f64> {
            v.iter()
                .zip(&keep)
                .filter_map(|(x, k)| k.then_some(*x))
                .collect()
        };
        (pick(data), pick(ref_data), weights.map(pick))
    }
}

/// Drops pairs where either value is NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterNaN;

impl DataFilter for FilterNaN {
    fn mask(&self, data: &[f64], ref_data: &[f64]) -> Vec<bool> {
        data.iter()
            .zip(ref_data)
            .map(|(d, r)| !d.is_nan() && !r.is_nan())
            .collect()
    }
}

/// Drops pairs where either value lies outside `[low, high]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterByLimit {
    low: Option<f64>,
    high: Option<f64>,
}

impl FilterByLimit {
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }

    fn inside(&self, v: f64) -> bool {
        self.low.is_none_or(|lo| v >= lo) && self.high.is_none_or(|hi| v <= hi)
    }
}

impl DataFilter for FilterByLimit {
    fn mask(&self, data: &[f64], ref_data: &[f64]) -> Vec<bool> {
        data.iter()
            .zip(ref_data)
            .map(|(d, r)| self.inside(*d) && self.inside(*r))
            .collect()
    }
}

/// Reduces a computed result.
pub trait StatisticsFilter {
    fn apply(&self, stats: StatsDict) -> StatsDict;
}

/// Removes the named statistics from a result.
#[derive(Debug, Clone, Default)]
pub struct FilterDropStats {
    names: Vec<String>,
}

impl FilterDropStats {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl StatisticsFilter for FilterDropStats {
    fn apply(&self, mut stats: StatsDict) -> StatsDict {
        for name in &self.names {
            stats.remove(name);
        }
        stats
    }
}
