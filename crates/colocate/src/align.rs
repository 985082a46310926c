//! Time alignment shared by the colocation routines.

use aerocol_colocated::{ColocatedData, TimeResampleOptions};
use aerocol_resample::{
    Aggregation, ResampleConfig, ResampleStep, TimeSeries, plan_steps, resample, resample_step,
};
use aerocol_tstype::TsType;
use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

use crate::error::ColocateError;
use crate::options::ColocationOptions;

/// First and last instant covered by `time` at resolution `ts_type`.
///
/// The range is widened to whole periods so that a monthly series labelled
/// mid-month still covers the entire month.
pub(crate) fn period_span(
    time: &[NaiveDateTime],
    ts_type: TsType,
) -> Result<Option<(NaiveDateTime, NaiveDateTime)>, ColocateError> {
    let (Some(first), Some(last)) = (time.first(), time.last()) else {
        return Ok(None);
    };
    if ts_type.is_native() {
        return Ok(Some((*first, *last)));
    }
    let start = ts_type.floor(*first)?;
    let stop = ts_type.add_periods(ts_type.floor(*last)?, 1)? - TimeDelta::seconds(1);
    Ok(Some((start, stop)))
}

/// Intersection of two spans, further limited by the requested period.
pub(crate) fn overlap(
    a: (NaiveDateTime, NaiveDateTime),
    b: (NaiveDateTime, NaiveDateTime),
    opts: &ColocationOptions,
) -> Result<(NaiveDateTime, NaiveDateTime), ColocateError> {
    let mut start = a.0.max(b.0);
    let mut stop = a.1.min(b.1);
    if let Some(s) = opts.start() {
        start = start.max(s);
    }
    if let Some(s) = opts.stop() {
        stop = stop.min(s);
    }
    if start > stop {
        return Err(ColocateError::TimeMatch {
            reason: format!(
                "no overlap between {} - {} and {} - {} within the requested period",
                a.0, a.1, b.0, b.1
            ),
        });
    }
    Ok((start, stop))
}

/// Coarsest of `sources`, further limited by the requested resolution.
pub(crate) fn resolve_ts_type(
    desired: Option<TsType>,
    sources: &[TsType],
) -> Result<TsType, ColocateError> {
    let coarsest = sources.iter().copied().min().ok_or_else(|| ColocateError::Internal {
        reason: "no source resolutions given".to_string(),
    })?;
    let target = match desired {
        Some(d) if d > coarsest => {
            debug!(requested = %d, used = %coarsest, "requested ts_type finer than the inputs");
            coarsest
        }
        Some(d) => d,
        None => coarsest,
    };
    if target.is_native() {
        return Err(ColocateError::Setup {
            reason: "cannot colocate onto a native (irregular) time axis".to_string(),
        });
    }
    Ok(target)
}

/// Resamples `series` from `from` to `to`, labelling every value with the
/// start of its output period.
pub(crate) fn series_to_target(
    series: &TimeSeries,
    from: &TsType,
    to: &TsType,
    config: &ResampleConfig,
) -> Result<TimeSeries, ColocateError> {
    let plan = plan_steps(from, to, config)?;
    if plan.is_empty() {
        let step = ResampleStep {
            to: *to,
            min_count: 1,
            how: Aggregation::Mean,
        };
        return Ok(resample_step(series, &step)?);
    }
    Ok(resample(series, &plan)?)
}

/// Resamples a container colocated at a finer resolution to the target,
/// masking each side where the other is missing.
pub(crate) fn finish_colocate_time(
    coldata: ColocatedData,
    target: TsType,
    opts: &ColocationOptions,
) -> Result<ColocatedData, ColocateError> {
    let resample_opts = TimeResampleOptions::new(target)
        .with_min_num_obs(opts.min_num_obs().clone())
        .with_how(opts.resample_how().clone())
        .with_colocate_time(true);
    let out = coldata.resample_time(&resample_opts)?;
    require_valid_obs(&out)?;
    Ok(out)
}

/// Fails if the reference side holds no valid value.
pub(crate) fn require_valid_obs(coldata: &ColocatedData) -> Result<(), ColocateError> {
    if coldata.ref_data().iter().all(|v| v.is_nan()) {
        return Err(ColocateError::Colocation {
            reason: "no valid observations left after colocation".to_string(),
        });
    }
    Ok(())
}
