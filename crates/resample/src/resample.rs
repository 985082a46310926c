//! Hierarchical resampling to a coarser ts_type.

use std::collections::BTreeMap;

use aerocol_tstype::{MinNumObs, TsType};
use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::ResampleConfig;
use crate::error::ResampleError;
use crate::how::Aggregation;
use crate::series::TimeSeries;

/// One aggregation level of a resampling plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleStep {
    /// Resolution produced by this step.
    pub to: TsType,
    /// Valid input samples required per output period.
    pub min_count: u32,
    pub how: Aggregation,
}

/// Builds the chain of aggregation steps from `from` to `to`.
///
/// An intermediate step is added at every level between `from` and `to`
/// where a coverage rule starts or where a rule from the previous level
/// ends, so a month built from hourly data only counts days, and a
/// `daily -> monthly` rule applies even without an hourly rule. Steps with
/// no rule of their own require 0 samples. A final step to `to` is always
/// added. A `Fixed` requirement yields a single direct step.
pub fn plan_steps(
    from: &TsType,
    to: &TsType,
    config: &ResampleConfig,
) -> Result<Vec<ResampleStep>, ResampleError> {
    if to > from {
        return Err(aerocol_tstype::TemporalResolutionError::FinerTarget {
            from: from.to_string(),
            to: to.to_string(),
        }
        .into());
    }
    if to == from {
        return Ok(Vec::new());
    }
    let how_for = |a: &TsType, b: &TsType| config.how().lookup(a, b).unwrap_or(config.default_how());

    let rules = config.min_num_obs();
    if let MinNumObs::Fixed(n) = rules {
        return Ok(vec![ResampleStep {
            to: *to,
            min_count: *n,
            how: how_for(from, to),
        }]);
    }

    let mut steps = Vec::new();
    let mut last = *from;
    if let (MinNumObs::Hierarchical(list), false) = (rules, from.is_native()) {
        // Finest level strictly between `last` and `to` where a rule starts,
        // or where a rule from `last` ends.
        while let Some(next) = list
            .iter()
            .flat_map(|r| {
                let end = (r.from == last).then_some(r.to);
                [Some(r.from), end]
            })
            .flatten()
            .filter(|level| *level < last && *level > *to)
            .max()
        {
            steps.push(ResampleStep {
                to: next,
                min_count: rules.lookup(&last, &next).unwrap_or(0),
                how: how_for(&last, &next),
            });
            last = next;
        }
    }
    steps.push(ResampleStep {
        to: *to,
        min_count: rules.lookup(&last, to).unwrap_or(0),
        how: how_for(&last, to),
    });
    Ok(steps)
}

/// Applies one step: groups by output period and aggregates valid samples.
///
/// The output is dense from the period of the first sample to the period of
/// the last; periods with fewer than `min_count` valid samples are NaN.
pub fn resample_step(series: &TimeSeries, step: &ResampleStep) -> Result<TimeSeries, ResampleError> {
    let (Some(first), Some(last)) = (series.time().first(), series.time().last()) else {
        return Ok(TimeSeries::default());
    };
    let mut groups: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
    for (t, v) in series.time().iter().zip(series.values()) {
        let entry = groups.entry(step.to.floor(*t)?).or_default();
        if !v.is_nan() {
            entry.push(*v);
        }
    }
    let index = step.to.time_index(*first, *last)?;
    let values = index
        .iter()
        .map(|t| match groups.get(t) {
            Some(valid) if valid.len() >= step.min_count as usize => step.how.apply(valid),
            _ => f64::NAN,
        })
        .collect();
    TimeSeries::new(index, values)
}

/// Runs every step of `plan` in order.
pub fn resample(series: &TimeSeries, plan: &[ResampleStep]) -> Result<TimeSeries, ResampleError> {
    let mut out = series.clone();
    for step in plan {
        out = resample_step(&out, step)?;
        debug!(
            to = %step.to,
            min_count = step.min_count,
            how = %step.how,
            valid = out.num_valid(),
            "resample step"
        );
    }
    Ok(out)
}

/// Plans and applies resampling from `from` to `to`.
pub fn resample_to(
    series: &TimeSeries,
    from: &TsType,
    to: &TsType,
    config: &ResampleConfig,
) -> Result<TimeSeries, ResampleError> {
    let plan = plan_steps(from, to, config)?;
    resample(series, &plan)
}
