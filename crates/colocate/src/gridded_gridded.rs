//! Colocation of two gridded fields.

use aerocol_colocated::{ColocatedData, ColocationMeta};
use aerocol_resample::ResampleConfig;
use chrono::NaiveDateTime;
use ndarray::{Array3, Axis, stack};
use tracing::{debug, info, instrument};

use crate::align::{finish_colocate_time, overlap, period_span, require_valid_obs, resolve_ts_type};
use crate::error::ColocateError;
use crate::gridded::GriddedData;
use crate::options::ColocationOptions;
use crate::regrid::{regrid, regrid_res_deg};

/// Colocates a model field with a gridded observation field.
///
/// Both fields are cropped to their common period, resampled to the output
/// resolution, brought onto one grid (the observation grid, or a regular
/// grid of `regrid_res_deg`), and filtered to the configured region. The
/// result is a `(2, time, lat, lon)` container over a dense time index.
///
/// # Errors
///
/// [`ColocateError::TimeMatch`] without a common period,
/// [`ColocateError::DataUnit`] for unconvertible units and
/// [`ColocateError::Colocation`] if the aligned grids differ or no valid
/// observation is left.
#[instrument(skip_all, fields(model = model.data_id(), obs = obs.data_id(), var = obs.var_name()))]
pub fn colocate_gridded_gridded(
    model: &GriddedData,
    obs: &GriddedData,
    opts: &ColocationOptions,
) -> Result<ColocatedData, ColocateError> {
    opts.validate()?;
    if opts.climatology().is_some() {
        return Err(ColocateError::Setup {
            reason: "an observation climatology requires station observations".to_string(),
        });
    }
    for field in [model, obs] {
        if field.num_levels() != 1 {
            return Err(ColocateError::DataDimension {
                reason: format!(
                    "'{}' of '{}' has {} levels, select one before colocating",
                    field.var_name(),
                    field.data_id(),
                    field.num_levels()
                ),
            });
        }
    }

    let base = resolve_ts_type(None, &[model.ts_type(), obs.ts_type()])?;
    let target = resolve_ts_type(opts.ts_type(), &[model.ts_type(), obs.ts_type()])?;
    if opts.colocate_time() && target < base {
        debug!(base = %base, target = %target, "colocating at base resolution first");
        let inner = opts.clone().with_ts_type(Some(base)).with_colocate_time(false);
        let coldata = colocate_gridded_gridded(model, obs, &inner)?;
        return finish_colocate_time(coldata, target, opts);
    }

    let span = |f: &GriddedData| -> Result<(NaiveDateTime, NaiveDateTime), ColocateError> {
        period_span(f.time(), f.ts_type())?.ok_or_else(|| ColocateError::TimeMatch {
            reason: format!("'{}' of '{}' has no time steps", f.var_name(), f.data_id()),
        })
    };
    let (start, stop) = overlap(span(model)?, span(obs)?, opts)?;

    let mut model_c = model.crop_time(start, stop);
    let obs_c = obs.crop_time(start, stop);
    if opts.harmonise_units()
        && let (Some(mu), Some(ou)) = (model_c.units(), obs_c.units())
        && mu != ou
    {
        let ou = ou.to_string();
        model_c.convert_units(&ou)?;
    }

    let obs_r = obs_c.resample_time(target, &opts.resample_config())?;
    let model_r = model_c.resample_time(
        target,
        &ResampleConfig::new().with_how(opts.resample_how().clone()),
    )?;

    let (model_g, obs_g) = match opts.regrid_res_deg() {
        Some(res) => (regrid_res_deg(&model_r, res)?, regrid_res_deg(&obs_r, res)?),
        None => {
            let m = regrid(&model_r, obs_r.latitude(), obs_r.longitude())?;
            (m, obs_r)
        }
    };

    let region = opts.region()?;
    let model_f = model_g.filter_region(&region)?;
    let obs_f = obs_g.filter_region(&region)?;

    let index = target.time_index(start, stop)?;
    let obs_arr = obs_f.reindex_time(&index)?.index_axis_move(Axis(1), 0);
    let model_arr = model_f.reindex_time(&index)?.index_axis_move(Axis(1), 0);

    let mut meta = ColocationMeta::new(obs.data_id(), model.data_id(), obs.var_name(), model.var_name())
        .with_ts_type(target)
        .with_units(
            obs_f.units().map(str::to_string),
            model_f.units().map(str::to_string),
        )
        .with_period(start, stop)
        .with_filter_name(opts.filter_name());
    meta.ts_type_src = [Some(obs.ts_type()), Some(model.ts_type())];
    meta.min_num_obs = Some(opts.min_num_obs().clone());
    meta.resample_how = Some(opts.resample_how().clone());
    meta.regrid_res_deg = opts.regrid_res_deg();

    let coldata = stack_gridded(
        &obs_arr,
        &model_arr,
        index,
        obs_f.latitude().to_vec(),
        obs_f.longitude().to_vec(),
        meta,
    )?;
    require_valid_obs(&coldata)?;
    info!(
        ts_type = %target,
        shape = ?coldata.shape(),
        "colocated gridded fields"
    );
    Ok(coldata)
}

/// Stacks aligned `(time, lat, lon)` observation and model arrays into a
/// gridded container.
///
/// The two arrays must have identical shapes; anything else means the
/// spatial alignment went wrong and is reported instead of truncated.
pub fn stack_gridded(
    obs: &Array3<f64>,
    model: &Array3<f64>,
    time: Vec<NaiveDateTime>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    meta: ColocationMeta,
) -> Result<ColocatedData, ColocateError> {
    if obs.shape() != model.shape() {
        return Err(ColocateError::Colocation {
            reason: format!(
                "aligned grids differ: observations {:?}, model {:?}",
                obs.shape(),
                model.shape()
            ),
        });
    }
    let data = stack(Axis(0), &[obs.view(), model.view()])?;
    Ok(ColocatedData::grid(data, time, latitude, longitude, meta)?)
}
