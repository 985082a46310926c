//! Named statistics and their formulas.
//!
//! Every formula takes filtered data (model), reference data (observation)
//! and optional normalised weights of equal length. Inputs are finite.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::descriptive::{weighted_mean, weighted_std};
use crate::error::StatsError;

/// A statistic computed by [`calculate_statistics`](crate::calculate_statistics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Statistic {
    RefdataMean,
    RefdataStd,
    DataMean,
    DataStd,
    /// Root mean square error.
    Rms,
    /// Normalised mean bias.
    Nmb,
    /// Modified normalised mean bias.
    Mnmb,
    /// Mean bias.
    Mb,
    /// Mean absolute bias.
    Mab,
    /// Fractional gross error.
    Fge,
    /// Pearson correlation.
    R,
    RSpearman,
    /// Kendall tau-b.
    RKendall,
}

impl Statistic {
    /// Default statistic set, in output order.
    pub const DEFAULT: [Statistic; 13] = [
        Statistic::RefdataMean,
        Statistic::RefdataStd,
        Statistic::DataMean,
        Statistic::DataStd,
        Statistic::Rms,
        Statistic::Nmb,
        Statistic::Mnmb,
        Statistic::Mb,
        Statistic::Mab,
        Statistic::Fge,
        Statistic::R,
        Statistic::RSpearman,
        Statistic::RKendall,
    ];

    /// Output key.
    pub fn name(self) -> &'static str {
        match self {
            Statistic::RefdataMean => "refdata_mean",
            Statistic::RefdataStd => "refdata_std",
            Statistic::DataMean => "data_mean",
            Statistic::DataStd => "data_std",
            Statistic::Rms => "rms",
            Statistic::Nmb => "nmb",
            Statistic::Mnmb => "mnmb",
            Statistic::Mb => "mb",
            Statistic::Mab => "mab",
            Statistic::Fge => "fge",
            Statistic::R => "R",
            Statistic::RSpearman => "R_spearman",
            Statistic::RKendall => "R_kendall",
        }
    }

    /// Evaluates this statistic.
    pub fn compute(self, data: &[f64], ref_data: &[f64], weights: Option<&[f64]>) -> f64 {
        match self {
            Statistic::RefdataMean => weighted_mean(ref_data, weights),
            Statistic::RefdataStd => weighted_std(ref_data, weights),
            Statistic::DataMean => weighted_mean(data, weights),
            Statistic::DataStd => weighted_std(data, weights),
            Statistic::Rms => rms(data, ref_data, weights),
            Statistic::Nmb => nmb(data, ref_data, weights),
            Statistic::Mnmb => mnmb(data, ref_data, weights),
            Statistic::Mb => {
                let diff: Vec<f64> = data.iter().zip(ref_data).map(|(d, r)| d - r).collect();
                weighted_mean(&diff, weights)
            }
            Statistic::Mab => {
                let diff: Vec<f64> = data
                    .iter()
                    .zip(ref_data)
                    .map(|(d, r)| (d - r).abs())
                    .collect();
                weighted_mean(&diff, weights)
            }
            Statistic::Fge => fge(data, ref_data, weights),
            Statistic::R => pearson(data, ref_data, weights),
            Statistic::RSpearman => spearman(data, ref_data),
            Statistic::RKendall => kendall_tau_b(data, ref_data),
        }
    }
}

impl FromStr for Statistic {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::DEFAULT
            .iter()
            .copied()
            .find(|st| st.name() == s)
            .ok_or_else(|| StatsError::UnknownStatistic {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for Statistic {
    type Error = StatsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Statistic> for String {
    fn from(value: Statistic) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ----- Bias and error -----

fn rms(data: &[f64], ref_data: &[f64], w: Option<&[f64]>) -> f64 {
    let sq: Vec<f64> = data
        .iter()
        .zip(ref_data)
        .map(|(d, r)| (d - r) * (d - r))
        .collect();
    weighted_mean(&sq, w).sqrt()
}

fn nmb(data: &[f64], ref_data: &[f64], w: Option<&[f64]>) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, (d, r)) in data.iter().zip(ref_data).enumerate() {
        let wi = w.map_or(1.0, |w| w[i]);
        num += wi * (d - r);
        den += wi * r;
    }
    if den == 0.0 { f64::NAN } else { num / den }
}

/// Ratio `(d - r) / (d + r)` with zero-sum pairs contributing 0.
fn symmetric_ratios(data: &[f64], ref_data: &[f64]) -> Vec<f64> {
    data.iter()
        .zip(ref_data)
        .map(|(d, r)| {
            let s = d + r;
            if s == 0.0 { 0.0 } else { (d - r) / s }
        })
        .collect()
}

fn mnmb(data: &[f64], ref_data: &[f64], w: Option<&[f64]>) -> f64 {
    2.0 * weighted_mean(&symmetric_ratios(data, ref_data), w)
}

fn fge(data: &[f64], ref_data: &[f64], w: Option<&[f64]>) -> f64 {
    let abs: Vec<f64> = symmetric_ratios(data, ref_data)
        .into_iter()
        .map(f64::abs)
        .collect();
    2.0 * weighted_mean(&abs, w)
}

// ----- Correlation -----

/// Weighted Pearson correlation. NaN for fewer than 2 pairs or constant input.
pub fn pearson(x: &[f64], y: &[f64], w: Option<&[f64]>) -> f64 {
    if x.len() < 2 {
        return f64::NAN;
    }
    let mx = weighted_mean(x, w);
    let my = weighted_mean(y, w);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for i in 0..x.len() {
        let wi = w.map_or(1.0, |w| w[i]);
        let dx = x[i] - mx;
        let dy = y[i] - my;
        sxy += wi * dx * dy;
        sxx += wi * dx * dx;
        syy += wi * dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// 1-based ranks, ties receiving their average rank.
fn average_ranks(x: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));
    let mut ranks = vec![0.0; x.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && x[order[j + 1]] == x[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Spearman rank correlation.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&average_ranks(x), &average_ranks(y), None)
}

/// Number of tied pairs in a sorted slice.
fn tied_pairs<T: PartialEq>(sorted: &[T]) -> u64 {
    let mut total = 0u64;
    let mut run = 1u64;
    for i in 1..sorted.len() {
        if sorted[i] == sorted[i - 1] {
            run += 1;
        } else {
            total += run * (run - 1) / 2;
            run = 1;
        }
    }
    total + run * (run - 1) / 2
}

/// Merge sort counting strict inversions.
fn sort_counting_swaps(v: &mut Vec<f64>) -> u64 {
    let n = v.len();
    if n < 2 {
        return 0;
    }
    let mut right = v.split_off(n / 2);
    let mut swaps = sort_counting_swaps(v) + sort_counting_swaps(&mut right);
    let mut merged = Vec::with_capacity(n);
    let (mut i, mut j) = (0, 0);
    while i < v.len() && j < right.len() {
        if right[j] < v[i] {
            merged.push(right[j]);
            swaps += (v.len() - i) as u64;
            j += 1;
        } else {
            merged.push(v[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&v[i..]);
    merged.extend_from_slice(&right[j..]);
    *v = merged;
    swaps
}

/// Kendall tau-b in O(n log n).
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let tie_x = tied_pairs(&xs);
    let tie_xy = tied_pairs(&pairs);

    let mut ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let swaps = sort_counting_swaps(&mut ys);
    let tie_y = tied_pairs(&ys);

    let n0 = (n as u64) * (n as u64 - 1) / 2;
    let con_minus_dis =
        n0 as f64 - tie_x as f64 - tie_y as f64 + tie_xy as f64 - 2.0 * swaps as f64;
    let denom = ((n0 - tie_x) as f64 * (n0 - tie_y) as f64).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (con_minus_dis / denom).clamp(-1.0, 1.0)
}
