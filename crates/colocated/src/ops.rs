//! Transformations of a colocated container.

use std::collections::BTreeSet;

use aerocol_resample::{
    Mda8Config, ResampleConfig, ResampleHow, TimeSeries, mask_jointly, mda8, plan_steps, resample,
};
use aerocol_tstype::{BaseFreq, MinNumObs, TemporalResolutionError, TsType};
use ndarray::{Array3, ArrayD, Axis, s};
use tracing::{debug, info};

use crate::colocated::{ColocatedData, Layout};
use crate::error::ColocatedDataError;
use crate::region::Region;

/// Options of [`ColocatedData::resample_time`].
///
/// # Example
///
/// ```
/// use aerocol_colocated::TimeResampleOptions;
/// use aerocol_tstype::MinNumObs;
///
/// let opts = TimeResampleOptions::new("monthly".parse().unwrap())
///     .with_min_num_obs(MinNumObs::default_obs())
///     .with_colocate_time(true);
/// assert!(opts.colocate_time());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeResampleOptions {
    to: TsType,
    min_num_obs: Option<MinNumObs>,
    how: Option<ResampleHow>,
    colocate_time: bool,
    settings_from_meta: bool,
}

impl TimeResampleOptions {
    /// Resample to `to` without coverage rules, mean aggregation.
    pub fn new(to: TsType) -> Self {
        Self {
            to,
            min_num_obs: None,
            how: None,
            colocate_time: false,
            settings_from_meta: false,
        }
    }

    pub fn with_min_num_obs(mut self, min_num_obs: MinNumObs) -> Self {
        self.min_num_obs = Some(min_num_obs);
        self
    }

    pub fn with_how(mut self, how: ResampleHow) -> Self {
        self.how = Some(how);
        self
    }

    /// Mask both sides wherever either is missing before aggregating.
    pub fn with_colocate_time(mut self, colocate_time: bool) -> Self {
        self.colocate_time = colocate_time;
        self
    }

    /// Fill unset options from the container's metadata.
    pub fn with_settings_from_meta(mut self, settings_from_meta: bool) -> Self {
        self.settings_from_meta = settings_from_meta;
        self
    }

    // --- Accessors ---

    pub fn to(&self) -> TsType {
        self.to
    }

    pub fn min_num_obs(&self) -> Option<&MinNumObs> {
        self.min_num_obs.as_ref()
    }

    pub fn how(&self) -> Option<&ResampleHow> {
        self.how.as_ref()
    }

    pub fn colocate_time(&self) -> bool {
        self.colocate_time
    }

    pub fn settings_from_meta(&self) -> bool {
        self.settings_from_meta
    }
}

impl ColocatedData {
    // ----- Temporal resampling -----

    /// Copy of `self` resampled to a coarser resolution.
    pub fn resample_time(&self, opts: &TimeResampleOptions) -> Result<Self, ColocatedDataError> {
        let mut out = self.clone();
        out.resample_time_inplace(opts)?;
        Ok(out)
    }

    /// Resamples every spatial point of both sides to `opts.to()`.
    ///
    /// Fails if the target is finer than the current resolution; a target
    /// equal to the current resolution leaves the data unchanged.
    pub fn resample_time_inplace(
        &mut self,
        opts: &TimeResampleOptions,
    ) -> Result<(), ColocatedDataError> {
        let from = self.ts_type()?;
        let to = opts.to();
        if to > from {
            return Err(TemporalResolutionError::FinerTarget {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        if to == from {
            debug!(ts_type = %to, "resample_time: already at target resolution");
            return Ok(());
        }

        let (min_num_obs, how, colocate_time) = if opts.settings_from_meta() {
            (
                opts.min_num_obs().or(self.meta.min_num_obs.as_ref()).cloned(),
                opts.how().or(self.meta.resample_how.as_ref()).cloned(),
                opts.colocate_time() || self.meta.colocate_time,
            )
        } else {
            (
                opts.min_num_obs().cloned(),
                opts.how().cloned(),
                opts.colocate_time(),
            )
        };
        let config = ResampleConfig::new()
            .with_min_num_obs(min_num_obs.clone().unwrap_or_default())
            .with_how(how.clone().unwrap_or_default());
        config.validate()?;
        let plan = plan_steps(&from, &to, &config)?;

        let time = self.time()?.to_vec();
        let flat = self.flat()?;
        let np = flat.shape()[2];
        let index = resample(
            &TimeSeries::new(time.clone(), vec![f64::NAN; time.len()])?,
            &plan,
        )?
        .into_parts()
        .0;

        let mut out = Array3::<f64>::from_elem((2, index.len(), np), f64::NAN);
        for p in 0..np {
            let mut r = flat.slice(s![0, .., p]).to_vec();
            let mut m = flat.slice(s![1, .., p]).to_vec();
            if colocate_time {
                mask_jointly(&mut r, &mut m);
            }
            for (src, values) in [(0, r), (1, m)] {
                let series = resample(&TimeSeries::new(time.clone(), values)?, &plan)?;
                let col = series.reindex(&index);
                out.slice_mut(s![src, .., p])
                    .iter_mut()
                    .zip(col)
                    .for_each(|(o, v)| *o = v);
            }
        }
        self.set_flat(out, index)?;
        self.meta.ts_type = Some(to);
        self.meta.min_num_obs = min_num_obs;
        self.meta.resample_how = how;
        self.meta.colocate_time = colocate_time;
        info!(from = %from, to = %to, points = np, "resampled colocated data");
        Ok(())
    }

    // ----- Spatial filtering -----

    /// Restricts the data to a predefined region, or to stations in a
    /// country when `check_country_meta` is set.
    pub fn filter_region(
        &self,
        region: &str,
        check_country_meta: bool,
    ) -> Result<Self, ColocatedDataError> {
        if !check_country_meta {
            return self.apply_latlon_filter(&Region::get(region)?);
        }
        self.require_point("country filter")?;
        let countries = self.country()?;
        let keep: Vec<usize> = countries
            .iter()
            .enumerate()
            .filter(|(_, c)| c.eq_ignore_ascii_case(region))
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(ColocatedDataError::DataCoverage {
                reason: format!("no stations in country '{region}'"),
            });
        }
        let mut out = self.select_points(&keep)?;
        out.meta.filter_name = Some(region.to_string());
        Ok(out)
    }

    /// Restricts the data to a latitude/longitude box.
    ///
    /// Station data supports boxes crossing the antimeridian and may end up
    /// without stations. Gridded data fails with
    /// [`ColocatedDataError::DataCoverage`] for crossing boxes and for
    /// boxes containing no grid cell.
    pub fn apply_latlon_filter(&self, region: &Region) -> Result<Self, ColocatedDataError> {
        if region.lat_range.0 > region.lat_range.1 {
            return Err(ColocatedDataError::DataCoverage {
                reason: format!(
                    "invalid latitude range ({}, {}) for region '{}'",
                    region.lat_range.0, region.lat_range.1, region.name
                ),
            });
        }
        let lat = self.latitude()?;
        let lon = self.longitude()?;
        let mut out = match self.layout() {
            Layout::Point => {
                let keep: Vec<usize> = lat
                    .iter()
                    .zip(lon)
                    .enumerate()
                    .filter(|(_, (la, lo))| region.contains(**la, **lo))
                    .map(|(i, _)| i)
                    .collect();
                self.select_points(&keep)?
            }
            Layout::Grid => {
                if region.crosses_antimeridian() {
                    return Err(ColocatedDataError::DataCoverage {
                        reason: format!(
                            "region '{}' crosses the antimeridian, not supported for gridded data",
                            region.name
                        ),
                    });
                }
                let lat_idx: Vec<usize> = indices(lat, |v| region.contains_lat(v));
                let lon_idx: Vec<usize> = indices(lon, |v| region.contains_lon(v));
                if lat_idx.is_empty() || lon_idx.is_empty() {
                    return Err(ColocatedDataError::DataCoverage {
                        reason: format!("no grid cells in region '{}'", region.name),
                    });
                }
                let mut out = self.clone();
                out.data = self
                    .data
                    .select(Axis(2), &lat_idx)
                    .select(Axis(3), &lon_idx);
                out.latitude = Some(lat_idx.iter().map(|&i| lat[i]).collect());
                out.longitude = Some(lon_idx.iter().map(|&i| lon[i]).collect());
                out
            }
        };
        debug!(
            region = %region.name,
            remaining = out.num_coords(),
            "applied lat/lon filter"
        );
        out.meta.filter_name = Some(region.name.clone());
        Ok(out)
    }

    fn select_points(&self, keep: &[usize]) -> Result<Self, ColocatedDataError> {
        self.require_point("station selection")?;
        let pick_f = |v: &Option<Vec<f64>>| -> Option<Vec<f64>> {
            v.as_ref().map(|v| keep.iter().map(|&i| v[i]).collect())
        };
        let pick_s = |v: &Option<Vec<String>>| -> Option<Vec<String>> {
            v.as_ref()
                .map(|v| keep.iter().map(|&i| v[i].clone()).collect())
        };
        Ok(ColocatedData {
            data: self.data.select(Axis(2), keep),
            time: self.time.clone(),
            station_name: pick_s(&self.station_name),
            latitude: pick_f(&self.latitude),
            longitude: pick_f(&self.longitude),
            altitude: pick_f(&self.altitude),
            country: pick_s(&self.country),
            meta: self.meta.clone(),
        })
    }

    // ----- Value edits -----

    /// Replaces exact zeros on both sides with NaN.
    pub fn set_zeros_nan(&mut self) {
        self.data.mapv_inplace(|v| if v == 0.0 { f64::NAN } else { v });
        self.meta.zeros_to_nan = true;
    }

    /// Replaces values outside `[low, high]` on both sides with NaN.
    pub fn remove_outliers(&mut self, low: Option<f64>, high: Option<f64>) {
        let low = low.unwrap_or(f64::NEG_INFINITY);
        let high = high.unwrap_or(f64::INFINITY);
        self.data
            .mapv_inplace(|v| if v < low || v > high { f64::NAN } else { v });
    }

    /// Renames a variable on whichever side(s) carry `old`.
    pub fn rename_variable(&mut self, old: &str, new: &str) -> Result<(), ColocatedDataError> {
        let mut found = false;
        for name in self.meta.var_name.iter_mut().filter(|n| *n == old) {
            *name = new.to_string();
            found = true;
        }
        if !found {
            return Err(ColocatedDataError::UnknownVariable {
                name: old.to_string(),
            });
        }
        Ok(())
    }

    // ----- Derived products -----

    /// Daily maximum 8-hour mean of hourly data.
    ///
    /// Variable names get an `mda8` suffix and the result is daily.
    pub fn mda8(&self) -> Result<Self, ColocatedDataError> {
        let hourly = TsType::base_only(BaseFreq::Hourly);
        let ts_type = self.ts_type()?;
        if ts_type != hourly {
            return Err(ColocatedDataError::Unsupported {
                reason: format!("mda8 requires hourly data, got '{ts_type}'"),
            });
        }
        let config = Mda8Config::new();
        let time = self.time()?.to_vec();
        let flat = self.flat()?;
        let np = flat.shape()[2];

        let mut columns = Vec::with_capacity(np);
        let mut index = Vec::new();
        for p in 0..np {
            let mut pair = Vec::with_capacity(2);
            for src in 0..2 {
                let series = TimeSeries::new(time.clone(), flat.slice(s![src, .., p]).to_vec())?;
                let daily = mda8(&series, &config)?;
                if index.is_empty() {
                    index = daily.time().to_vec();
                }
                pair.push(daily.reindex(&index));
            }
            columns.push(pair);
        }
        let mut out_data = Array3::<f64>::from_elem((2, index.len(), np), f64::NAN);
        for (p, pair) in columns.into_iter().enumerate() {
            for (src, col) in pair.into_iter().enumerate() {
                out_data
                    .slice_mut(s![src, .., p])
                    .iter_mut()
                    .zip(col)
                    .for_each(|(o, v)| *o = v);
            }
        }
        let mut out = self.clone();
        out.set_flat(out_data, index)?;
        out.meta.ts_type = Some(TsType::base_only(BaseFreq::Daily));
        for name in out.meta.var_name.iter_mut() {
            name.push_str("mda8");
        }
        Ok(out)
    }

    /// cos(latitude) weights broadcast to `(time, lat, lon)`.
    pub fn area_weights(&self) -> Result<ArrayD<f64>, ColocatedDataError> {
        if self.layout() != Layout::Grid {
            return Err(ColocatedDataError::DataDimension {
                reason: "area weights require latitude and longitude dimensions".to_string(),
            });
        }
        let cells = self.cell_weights()?;
        let shape = self.data.shape()[1..].to_vec();
        let nt = shape[0];
        let values: Vec<f64> = (0..nt).flat_map(|_| cells.iter().copied()).collect();
        Ok(ArrayD::from_shape_vec(shape, values)?)
    }

    /// Latitudes and longitudes of points with at least one valid
    /// reference value.
    pub fn get_coords_valid_obs(&self) -> Result<(Vec<f64>, Vec<f64>), ColocatedDataError> {
        let coords = self.point_coords()?;
        let flat = self.flat()?;
        Ok(coords
            .into_iter()
            .enumerate()
            .filter(|(p, _)| flat.slice(s![0, .., *p]).iter().any(|v| !v.is_nan()))
            .map(|(_, c)| c)
            .unzip())
    }

    /// Sorted distinct station countries.
    pub fn get_country_codes(&self) -> Result<Vec<String>, ColocatedDataError> {
        let unique: BTreeSet<&String> = self.country()?.iter().collect();
        Ok(unique.into_iter().cloned().collect())
    }
}

fn indices(values: &[f64], keep: impl Fn(f64) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| keep(**v))
        .map(|(i, _)| i)
        .collect()
}
