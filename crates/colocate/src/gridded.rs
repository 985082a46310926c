//! Regular latitude/longitude fields with optional vertical levels.

use aerocol_colocated::{ColocatedDataError, Region, VerticalLayer};
use aerocol_resample::{ResampleConfig, TimeSeries, resample_to};
use aerocol_tstype::TsType;
use chrono::{Datelike, NaiveDateTime};
use ndarray::{Array3, Array4, Axis, s};

use crate::error::ColocateError;
use crate::units::convert_values;

/// A gridded variable of one data source.
///
/// Values are stored as `(time, level, latitude, longitude)`. Surface fields
/// have a single level. Latitudes and longitudes are cell centres in
/// ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedData {
    data_id: String,
    var_name: String,
    units: Option<String>,
    ts_type: TsType,
    time: Vec<NaiveDateTime>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    level_altitude: Option<Vec<f64>>,
    data: Array4<f64>,
}

fn check_axis(name: &str, expected: usize, got: usize) -> Result<(), ColocateError> {
    if expected != got {
        return Err(ColocateError::DataDimension {
            reason: format!("{name} has length {got}, data axis has length {expected}"),
        });
    }
    Ok(())
}

impl GriddedData {
    /// Creates a single-level field from `(time, lat, lon)` values.
    pub fn surface(
        data_id: impl Into<String>,
        var_name: impl Into<String>,
        ts_type: TsType,
        time: Vec<NaiveDateTime>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        data: Array3<f64>,
    ) -> Result<Self, ColocateError> {
        Self::with_levels(
            data_id,
            var_name,
            ts_type,
            time,
            latitude,
            longitude,
            data.insert_axis(Axis(1)),
            None,
        )
    }

    /// Creates a field from `(time, level, lat, lon)` values.
    ///
    /// `level_altitude` gives the altitude of each level in metres.
    #[allow(clippy::too_many_arguments)]
    pub fn with_levels(
        data_id: impl Into<String>,
        var_name: impl Into<String>,
        ts_type: TsType,
        time: Vec<NaiveDateTime>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        data: Array4<f64>,
        level_altitude: Option<Vec<f64>>,
    ) -> Result<Self, ColocateError> {
        let (nt, nlev, nlat, nlon) = data.dim();
        check_axis("time", nt, time.len())?;
        check_axis("latitude", nlat, latitude.len())?;
        check_axis("longitude", nlon, longitude.len())?;
        if let Some(alt) = &level_altitude {
            check_axis("level_altitude", nlev, alt.len())?;
        }
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ColocateError::DataDimension {
                reason: "time must be strictly increasing".to_string(),
            });
        }
        Ok(Self {
            data_id: data_id.into(),
            var_name: var_name.into(),
            units: None,
            ts_type,
            time,
            latitude,
            longitude,
            level_altitude,
            data,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    // --- Accessors ---

    pub fn data_id(&self) -> &str {
        &self.data_id
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn ts_type(&self) -> TsType {
        self.ts_type
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    pub fn level_altitude(&self) -> Option<&[f64]> {
        self.level_altitude.as_deref()
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    pub fn num_levels(&self) -> usize {
        self.data.dim().1
    }

    /// Spatial shape `(lat, lon)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.latitude.len(), self.longitude.len())
    }

    // ----- Time -----

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((*self.time.first()?, *self.time.last()?))
    }

    /// Distinct years covered by the time axis.
    pub fn years_avail(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.time.iter().map(|t| t.year()).collect();
        years.dedup();
        years
    }

    /// Keeps time steps within `[start, stop]`.
    pub fn crop_time(&self, start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        let keep: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter(|(_, t)| **t >= start && **t <= stop)
            .map(|(i, _)| i)
            .collect();
        Self {
            time: keep.iter().map(|&i| self.time[i]).collect(),
            data: self.data.select(Axis(0), &keep),
            ..self.clone()
        }
    }

    /// Resamples every cell and level to `to`.
    pub fn resample_time(&self, to: TsType, config: &ResampleConfig) -> Result<Self, ColocateError> {
        if to == self.ts_type {
            return Ok(self.clone());
        }
        let (nt, nlev, nlat, nlon) = self.data.dim();
        let empty = TimeSeries::new(self.time.clone(), vec![f64::NAN; nt])?;
        let index = resample_to(&empty, &self.ts_type, &to, config)?.into_parts().0;
        let mut out = Array4::<f64>::from_elem((index.len(), nlev, nlat, nlon), f64::NAN);
        for l in 0..nlev {
            for i in 0..nlat {
                for j in 0..nlon {
                    let series =
                        TimeSeries::new(self.time.clone(), self.data.slice(s![.., l, i, j]).to_vec())?;
                    let res = resample_to(&series, &self.ts_type, &to, config)?;
                    if res.len() != index.len() {
                        return Err(ColocateError::Internal {
                            reason: format!(
                                "resampled cell has {} steps, expected {}",
                                res.len(),
                                index.len()
                            ),
                        });
                    }
                    out.slice_mut(s![.., l, i, j])
                        .iter_mut()
                        .zip(res.values())
                        .for_each(|(o, v)| *o = *v);
                }
            }
        }
        Ok(Self {
            ts_type: to,
            time: index,
            data: out,
            ..self.clone()
        })
    }

    /// Values at `index`, NaN where the field has no time step.
    ///
    /// Each time step is matched by the start of its period at the field's
    /// resolution. Two steps falling into the same period is an error.
    pub fn reindex_time(&self, index: &[NaiveDateTime]) -> Result<Array4<f64>, ColocateError> {
        let (_, nlev, nlat, nlon) = self.data.dim();
        let mut out = Array4::<f64>::from_elem((index.len(), nlev, nlat, nlon), f64::NAN);
        let mut filled = vec![false; index.len()];
        for (src, t) in self.time.iter().enumerate() {
            let label = if self.ts_type.is_native() {
                *t
            } else {
                self.ts_type.floor(*t)?
            };
            let Ok(k) = index.binary_search(&label) else {
                continue;
            };
            if filled[k] {
                return Err(ColocateError::Colocation {
                    reason: format!(
                        "'{}' has more than one {} step in period {label}",
                        self.var_name, self.ts_type
                    ),
                });
            }
            filled[k] = true;
            out.index_axis_mut(Axis(0), k)
                .assign(&self.data.index_axis(Axis(0), src));
        }
        Ok(out)
    }

    // ----- Levels -----

    /// Keeps only level `level`.
    pub fn select_level(&self, level: usize) -> Result<Self, ColocateError> {
        if level >= self.num_levels() {
            return Err(ColocateError::DataDimension {
                reason: format!("level {level} out of range (0..{})", self.num_levels()),
            });
        }
        Ok(Self {
            data: self.data.select(Axis(1), &[level]),
            level_altitude: self.level_altitude.as_ref().map(|a| vec![a[level]]),
            ..self.clone()
        })
    }

    /// Index of the level closest to `altitude` (metres).
    pub fn nearest_level(&self, altitude: f64) -> Option<usize> {
        let alt = self.level_altitude.as_ref()?;
        alt.iter()
            .enumerate()
            .filter(|(_, a)| !a.is_nan())
            .min_by(|(_, a), (_, b)| (*a - altitude).abs().total_cmp(&(*b - altitude).abs()))
            .map(|(i, _)| i)
    }

    /// Single-level field averaging the levels inside `layer`.
    pub fn layer_mean(&self, layer: &VerticalLayer) -> Result<Self, ColocateError> {
        let alt = self
            .level_altitude
            .as_ref()
            .ok_or_else(|| ColocateError::DataDimension {
                reason: format!("'{}' has no level altitudes", self.var_name),
            })?;
        let levels: Vec<usize> = alt
            .iter()
            .enumerate()
            .filter(|(_, a)| layer.contains(**a))
            .map(|(i, _)| i)
            .collect();
        let (nt, _, nlat, nlon) = self.data.dim();
        let mut out = Array4::<f64>::from_elem((nt, 1, nlat, nlon), f64::NAN);
        for ((t, _, i, j), o) in out.indexed_iter_mut() {
            let (sum, n) = levels
                .iter()
                .map(|&l| self.data[[t, l, i, j]])
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if n > 0 {
                *o = sum / n as f64;
            }
        }
        Ok(Self {
            data: out,
            level_altitude: Some(vec![(layer.start + layer.end) / 2.0]),
            ..self.clone()
        })
    }

    // ----- Values -----

    pub fn set_zeros_nan(&mut self) {
        self.data.mapv_inplace(|v| if v == 0.0 { f64::NAN } else { v });
    }

    pub fn remove_outliers(&mut self, low: f64, high: f64) {
        self.data
            .mapv_inplace(|v| if v < low || v > high { f64::NAN } else { v });
    }

    /// Converts values to `to`; fails if the current unit is unknown.
    pub fn convert_units(&mut self, to: &str) -> Result<(), ColocateError> {
        let from = self.units.clone().ok_or_else(|| ColocateError::DataUnit {
            from: "<undefined>".to_string(),
            to: to.to_string(),
        })?;
        if let Some(values) = self.data.as_slice_mut() {
            convert_values(values, &from, to)?;
        } else {
            let mut values: Vec<f64> = self.data.iter().copied().collect();
            convert_values(&mut values, &from, to)?;
            self.data = Array4::from_shape_vec(self.data.dim(), values)?;
        }
        self.units = Some(to.to_string());
        Ok(())
    }

    /// Keeps cells inside `region`.
    ///
    /// Fails for regions crossing the antimeridian and for regions without
    /// any cell.
    pub fn filter_region(&self, region: &Region) -> Result<Self, ColocateError> {
        if region.crosses_antimeridian() {
            return Err(ColocatedDataError::DataCoverage {
                reason: format!(
                    "region '{}' crosses the antimeridian, not supported for gridded data",
                    region.name
                ),
            }
            .into());
        }
        let lat_idx: Vec<usize> = indices(&self.latitude, |v| region.contains_lat(v));
        let lon_idx: Vec<usize> = indices(&self.longitude, |v| region.contains_lon(v));
        if lat_idx.is_empty() || lon_idx.is_empty() {
            return Err(ColocatedDataError::DataCoverage {
                reason: format!("no grid cells of '{}' in region '{}'", self.data_id, region.name),
            }
            .into());
        }
        Ok(Self {
            latitude: lat_idx.iter().map(|&i| self.latitude[i]).collect(),
            longitude: lon_idx.iter().map(|&i| self.longitude[i]).collect(),
            data: self.data.select(Axis(2), &lat_idx).select(Axis(3), &lon_idx),
            ..self.clone()
        })
    }

    /// Replaces the time axis; used after reindexing.
    pub(crate) fn with_time_axis(&self, ts_type: TsType, time: Vec<NaiveDateTime>, data: Array4<f64>) -> Self {
        Self {
            ts_type,
            time,
            data,
            ..self.clone()
        }
    }

    /// Replaces the spatial grid; used by regridding.
    pub(crate) fn with_grid(&self, latitude: Vec<f64>, longitude: Vec<f64>, data: Array4<f64>) -> Self {
        Self {
            latitude,
            longitude,
            data,
            ..self.clone()
        }
    }

    /// Number of valid values.
    pub fn num_valid(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
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

#[cfg(test)]
mod tests {
    use super::*;
    use aerocol_resample::Aggregation;
    use chrono::{NaiveDate, TimeDelta};

    fn hours(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|h| start + TimeDelta::hours(h as i64)).collect()
    }

    fn field() -> GriddedData {
        let data = Array4::from_shape_fn((48, 3, 2, 2), |(t, l, _, _)| (t % 24) as f64 + 100.0 * l as f64);
        GriddedData::with_levels(
            "model",
            "conco3",
            "hourly".parse().unwrap(),
            hours(48),
            vec![-10.0, 10.0],
            vec![0.0, 90.0],
            data,
            Some(vec![10.0, 500.0, 1500.0]),
        )
        .unwrap()
        .with_units("ug m-3")
    }

    #[test]
    fn shape_checked() {
        let err = GriddedData::surface(
            "m",
            "v",
            "daily".parse().unwrap(),
            hours(2),
            vec![0.0],
            vec![0.0],
            Array3::zeros((3, 1, 1)),
        )
        .unwrap_err();
        assert!(matches!(err, ColocateError::DataDimension { .. }));
    }

    #[test]
    fn reindex_rejects_two_steps_in_one_period() {
        let f = GriddedData::surface(
            "m",
            "v",
            "daily".parse().unwrap(),
            hours(2),
            vec![0.0],
            vec![0.0],
            Array3::zeros((2, 1, 1)),
        )
        .unwrap();
        let err = f.reindex_time(&hours(1)).unwrap_err();
        assert!(matches!(err, ColocateError::Colocation { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn resample_to_daily() {
        let cfg = ResampleConfig::new().with_default_how(Aggregation::Max);
        let daily = field().resample_time("daily".parse().unwrap(), &cfg).unwrap();
        assert_eq!(daily.time().len(), 2);
        assert_eq!(daily.data()[[1, 0, 0, 0]], 23.0);
        assert_eq!(daily.data()[[0, 2, 1, 1]], 223.0);
    }

    #[test]
    fn layer_mean_and_nearest() {
        let f = field();
        assert_eq!(f.nearest_level(1200.0), Some(2));
        let layer = f.layer_mean(&VerticalLayer::new(0.0, 1000.0)).unwrap();
        assert_eq!(layer.num_levels(), 1);
        assert_eq!(layer.data()[[5, 0, 0, 0]], 55.0);
    }

    #[test]
    fn crop_and_years() {
        let f = field();
        let cropped = f.crop_time(hours(48)[10], hours(48)[20]);
        assert_eq!(cropped.time().len(), 11);
        assert_eq!(f.years_avail(), vec![2010]);
    }

    #[test]
    fn convert_units() {
        let mut f = field();
        f.convert_units("mg m-3").unwrap();
        assert_eq!(f.units(), Some("mg m-3"));
        assert!((f.data()[[1, 0, 0, 0]] - 1e-3).abs() < 1e-15);
        assert!(f.convert_units("ppb").is_err());
    }

    #[test]
    fn region_filter() {
        let r = Region::new("north", (0.0, 90.0), (-180.0, 180.0));
        let f = field().filter_region(&r).unwrap();
        assert_eq!(f.grid_shape(), (1, 2));
        let wrap = Region::new("wrap", (-90.0, 90.0), (22.0, -170.0));
        assert!(field().filter_region(&wrap).is_err());
    }
}
