//! Colocation of a gridded model field with station observations.

use std::collections::BTreeSet;

use aerocol_colocated::{ColocatedData, ColocatedDataError, ColocationMeta};
use aerocol_resample::ResampleConfig;
use aerocol_tstype::{BaseFreq, TsType};
use chrono::{Datelike, NaiveDateTime};
use ndarray::Array3;
use tracing::{debug, info, instrument, warn};

use crate::align::{
    finish_colocate_time, overlap, period_span, require_valid_obs, resolve_ts_type, series_to_target,
};
use crate::climatology::stations_to_climatology;
use crate::error::ColocateError;
use crate::extract::extract_series;
use crate::gridded::GriddedData;
use crate::options::ColocationOptions;
use crate::source::VertWhich;
use crate::station::StationData;

/// Colocates a model field with the `obs_var` series of `stations`.
///
/// Stations outside the configured region or without `obs_var` are
/// dropped first. The model is cropped to the common period, resampled to
/// the output resolution and sampled at every station; observations are
/// resampled with the coverage rules. Both sides are placed on one dense
/// time index, missing steps becoming NaN. The result is a
/// `(2, time, station)` container.
///
/// All stations must belong to a single dataset.
///
/// # Errors
///
/// [`ColocateError::Setup`] for stations from several datasets,
/// [`ColocateError::TimeMatch`] without a common period,
/// [`ColocateError::Colocation`] if no valid observation is left and
/// [`ColocateError::Internal`] if the sampled model series does not match
/// the time index.
#[instrument(skip_all, fields(model = model.data_id(), var = obs_var))]
pub fn colocate_gridded_ungridded(
    model: &GriddedData,
    stations: &[StationData],
    obs_var: &str,
    opts: &ColocationOptions,
) -> Result<ColocatedData, ColocateError> {
    opts.validate()?;

    let datasets: BTreeSet<&str> = stations.iter().map(|s| s.dataset.as_str()).collect();
    if datasets.len() > 1 {
        return Err(ColocateError::Setup {
            reason: format!(
                "stations come from {} datasets ({}), colocate one at a time",
                datasets.len(),
                datasets.into_iter().collect::<Vec<_>>().join(", ")
            ),
        });
    }
    let obs_id = datasets.into_iter().next().unwrap_or("unknown").to_string();

    let with_var: Vec<&StationData> = stations.iter().filter(|s| s.series.contains_key(obs_var)).collect();
    if with_var.is_empty() {
        return Err(ColocateError::VariableNotFound {
            var_name: obs_var.to_string(),
            source_name: obs_id,
        });
    }
    let region = opts.region()?;
    let mut selected: Vec<StationData> = with_var
        .into_iter()
        .filter(|s| region.contains(s.latitude, s.longitude))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(ColocatedDataError::DataCoverage {
            reason: format!("no '{obs_id}' station with '{obs_var}' in region '{}'", region.name),
        }
        .into());
    }

    if let Some(clim) = opts.climatology() {
        let year = opts.start().map(|t| t.year()).ok_or_else(|| ColocateError::Setup {
            reason: "climatology mode requires a start date".to_string(),
        })?;
        let monthly = TsType::base_only(BaseFreq::Monthly);
        if opts.ts_type().is_some_and(|t| t > monthly) {
            return Err(ColocateError::Setup {
                reason: "an observation climatology cannot be compared below monthly resolution"
                    .to_string(),
            });
        }
        selected = stations_to_climatology(&selected, obs_var, clim, year, &opts.resample_config())?;
    }

    let obs_ts = selected
        .iter()
        .map(|s| s.ts_type)
        .min()
        .ok_or_else(|| ColocateError::Internal {
            reason: "station list emptied during selection".to_string(),
        })?;
    let base = resolve_ts_type(None, &[model.ts_type(), obs_ts])?;
    let target = resolve_ts_type(opts.ts_type(), &[model.ts_type(), obs_ts])?;
    if opts.colocate_time() && target < base {
        debug!(base = %base, target = %target, "colocating at base resolution first");
        let inner = opts.clone().with_ts_type(Some(base)).with_colocate_time(false);
        let coldata = colocate_stations(model, &selected, obs_var, &obs_id, base, &inner)?;
        return finish_colocate_time(coldata, target, opts);
    }
    colocate_stations(model, &selected, obs_var, &obs_id, target, opts)
}

fn obs_span(
    stations: &[StationData],
    var: &str,
) -> Result<Option<(NaiveDateTime, NaiveDateTime)>, ColocateError> {
    let mut span: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for st in stations {
        let Some(series) = st.series.get(var) else {
            continue;
        };
        if let Some((a, b)) = period_span(series.time(), st.ts_type)? {
            span = Some(match span {
                Some((s, e)) => (s.min(a), e.max(b)),
                None => (a, b),
            });
        }
    }
    Ok(span)
}

fn colocate_stations(
    model: &GriddedData,
    stations: &[StationData],
    obs_var: &str,
    obs_id: &str,
    target: TsType,
    opts: &ColocationOptions,
) -> Result<ColocatedData, ColocateError> {
    let obs_range = obs_span(stations, obs_var)?.ok_or_else(|| ColocateError::TimeMatch {
        reason: format!("'{obs_var}' of '{obs_id}' has no time steps"),
    })?;
    let model_range = period_span(model.time(), model.ts_type())?.ok_or_else(|| ColocateError::TimeMatch {
        reason: format!("'{}' of '{}' has no time steps", model.var_name(), model.data_id()),
    })?;
    let (start, stop) = overlap(model_range, obs_range, opts)?;

    let mut stations = stations.to_vec();
    let mut model_c = model.crop_time(start, stop);
    let obs_units = stations.iter().find_map(|s| s.units_of(obs_var)).map(str::to_string);
    if opts.harmonise_units()
        && let Some(ou) = &obs_units
    {
        if let Some(mu) = model_c.units()
            && mu != ou
        {
            model_c.convert_units(ou)?;
        }
        for st in &mut stations {
            if st.units_of(obs_var).is_some_and(|u| u != ou) {
                st.convert_units(obs_var, ou)?;
            }
        }
    }

    let model_r = model_c.resample_time(
        target,
        &ResampleConfig::new().with_how(opts.resample_how().clone()),
    )?;
    let index = target.time_index(start, stop)?;
    let model_i = model_r.with_time_axis(target, index.clone(), model_r.reindex_time(&index)?);

    let obs_config = opts.resample_config();
    let nt = index.len();
    let ns = stations.len();
    let mut data = Array3::<f64>::from_elem((2, nt, ns), f64::NAN);
    for (k, st) in stations.iter().enumerate() {
        let level = match opts.vert_which() {
            VertWhich::StationAltitude => model_i.nearest_level(st.altitude).unwrap_or(0),
            _ => 0,
        };
        let model_values = extract_series(&model_i, st.latitude, st.longitude, level, opts.extraction())?;
        if model_values.len() != nt {
            return Err(ColocateError::Internal {
                reason: format!(
                    "model series at '{}' has {} steps, time index has {nt}",
                    st.station_name,
                    model_values.len()
                ),
            });
        }
        let obs_values = match st.series.get(obs_var) {
            Some(series) => {
                let cropped = series.crop(start, stop);
                series_to_target(&cropped, &st.ts_type, &target, &obs_config)?.reindex(&index)
            }
            None => vec![f64::NAN; nt],
        };
        for t in 0..nt {
            data[[0, t, k]] = obs_values[t];
            data[[1, t, k]] = model_values[t];
        }
    }

    let mut meta = ColocationMeta::new(obs_id, model.data_id(), obs_var, model.var_name())
        .with_ts_type(target)
        .with_units(obs_units, model_i.units().map(str::to_string))
        .with_period(start, stop)
        .with_filter_name(opts.filter_name());
    meta.ts_type_src = [stations.iter().map(|s| s.ts_type).min(), Some(model.ts_type())];
    meta.min_num_obs = Some(opts.min_num_obs().clone());
    meta.resample_how = Some(opts.resample_how().clone());
    meta.obs_is_clim = opts.climatology().is_some();
    if opts.vert_which() == VertWhich::StationAltitude {
        meta.vert_code = Some("StationAltitude".to_string());
    }

    let mut coldata = ColocatedData::point(
        data,
        index,
        stations.iter().map(|s| s.station_name.clone()).collect(),
        stations.iter().map(|s| s.latitude).collect(),
        stations.iter().map(|s| s.longitude).collect(),
        meta,
    )?
    .with_altitude(stations.iter().map(|s| s.altitude).collect())?;
    if stations.iter().any(|s| s.country.is_some()) {
        coldata = coldata.with_country(
            stations
                .iter()
                .map(|s| s.country.clone().unwrap_or_default())
                .collect(),
        )?;
    }
    require_valid_obs(&coldata)?;
    let with_data = coldata.num_coords_with_data();
    if with_data < ns {
        warn!(stations = ns, with_data, "some stations have no paired data");
    }
    info!(ts_type = %target, stations = ns, times = nt, "colocated gridded model with stations");
    Ok(coldata)
}
