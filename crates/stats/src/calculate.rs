//! Statistics pipeline: pre-filter, compute, post-filter.

use tracing::debug;

use crate::config::StatisticsConfig;
use crate::dict::{NUM_VALID, ROLLED_UP_KEYS, StatsDict, TOTNUM};
use crate::error::StatsError;
use crate::filters::{DataFilter, FilterByLimit, FilterDropStats, FilterNaN, StatisticsFilter};

/// Computes agreement statistics of `data` (model) against `ref_data`.
///
/// Pairs with a NaN on either side are removed first, then pairs outside the
/// configured `[lowlim, highlim]`. Weights are normalised by their maximum.
/// If fewer than `min_num_valid` pairs remain every configured statistic is
/// NaN, but all keys are present. `totnum`, `weighted` and `num_valid` are
/// always reported.
///
/// # Errors
///
/// Returns [`StatsError::LengthMismatch`] when the inputs differ in length and
/// [`StatsError::InvalidWeights`] for negative or all-zero weights.
pub fn calculate_statistics(
    data: &[f64],
    ref_data: &[f64],
    weights: Option<&[f64]>,
    config: &StatisticsConfig,
) -> Result<StatsDict, StatsError> {
    config.validate()?;
    if ref_data.len() != data.len() {
        return Err(StatsError::LengthMismatch {
            field: "ref_data",
            expected: data.len(),
            got: ref_data.len(),
        });
    }
    if let Some(w) = weights
        && w.len() != data.len()
    {
        return Err(StatsError::LengthMismatch {
            field: "weights",
            expected: data.len(),
            got: w.len(),
        });
    }

    let mut result = StatsDict::new();
    result.insert(TOTNUM, data.len() as f64);
    result.set_weighted(Some(weights.is_some()));

    let (d, r, w) = FilterNaN.apply(data, ref_data, weights);
    let (d, r, w) = if config.lowlim().is_some() || config.highlim().is_some() {
        FilterByLimit::new(config.lowlim(), config.highlim()).apply(&d, &r, w.as_deref())
    } else {
        (d, r, w)
    };
    let num_valid = d.len();
    result.insert(NUM_VALID, num_valid as f64);

    let w = w.map(normalise_weights).transpose()?;

    if num_valid < config.min_num_valid() || num_valid == 0 {
        debug!(
            num_valid,
            min_num_valid = config.min_num_valid(),
            "too few valid pairs, statistics set to NaN"
        );
        for st in config.statistics() {
            result.insert(st.name(), f64::NAN);
        }
    } else {
        for st in config.statistics() {
            result.insert(st.name(), st.compute(&d, &r, w.as_deref()));
        }
    }

    Ok(FilterDropStats::new(config.drop_stats().iter().cloned()).apply(result))
}

fn normalise_weights(w: Vec<f64>) -> Result<Vec<f64>, StatsError> {
    if w.is_empty() {
        return Ok(w);
    }
    if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(StatsError::InvalidWeights {
            reason: "weights must be finite and non-negative".to_string(),
        });
    }
    let max = w.iter().copied().fold(0.0, f64::max);
    if max == 0.0 {
        return Err(StatsError::InvalidWeights {
            reason: "all weights are zero".to_string(),
        });
    }
    Ok(w.into_iter().map(|v| v / max).collect())
}

/// All-NaN placeholder with the same keys as a real result.
///
/// Built by running the pipeline on a single pair and blanking it, then
/// appending the rolled-up correlation keys.
pub fn stats_dummy(config: &StatisticsConfig) -> Result<StatsDict, StatsError> {
    let mut dummy = calculate_statistics(&[1.0], &[1.0], None, config)?;
    dummy.fill_nan();
    for key in ROLLED_UP_KEYS {
        dummy.insert(key, f64::NAN);
    }
    Ok(dummy)
}
