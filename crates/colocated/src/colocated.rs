//! The paired reference/model container.

use std::fmt;

use aerocol_stats::{Aggregate, StatisticsConfig, StatsDict, calculate_statistics};
use aerocol_tstype::TsType;
use chrono::NaiveDateTime;
use ndarray::{Array3, Array4, ArrayD, Axis, IxDyn, s};
use tracing::warn;

use crate::error::ColocatedDataError;
use crate::meta::ColocationMeta;

/// Statistics key with the number of spatial points in the container.
pub const NUM_COORDS_TOT: &str = "num_coords_tot";
/// Statistics key with the number of spatial points holding at least one valid pair.
pub const NUM_COORDS_WITH_DATA: &str = "num_coords_with_data";

/// Spatial arrangement of the paired array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `(data_source, time, station_name)`
    Point,
    /// `(data_source, time, latitude, longitude)`
    Grid,
}

impl Layout {
    pub fn name(self) -> &'static str {
        match self {
            Layout::Point => "point",
            Layout::Grid => "grid",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference and model values on a shared time/space index.
///
/// Axis 0 of [`data`](ColocatedData::data) is the data source: index 0 holds
/// the reference (observations), index 1 the model. Axis 1 is time; the
/// remaining axes are either stations or latitude/longitude.
///
/// Coordinates are optional so that a container can be built from a bare
/// array; properties needing a missing coordinate fail with
/// [`ColocatedDataError::MissingAttribute`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColocatedData {
    pub(crate) data: ArrayD<f64>,
    pub(crate) time: Option<Vec<NaiveDateTime>>,
    pub(crate) station_name: Option<Vec<String>>,
    pub(crate) latitude: Option<Vec<f64>>,
    pub(crate) longitude: Option<Vec<f64>>,
    pub(crate) altitude: Option<Vec<f64>>,
    pub(crate) country: Option<Vec<String>>,
    pub(crate) meta: ColocationMeta,
}

fn check_len(name: &str, expected: usize, got: usize) -> Result<(), ColocatedDataError> {
    if expected != got {
        return Err(ColocatedDataError::DataDimension {
            reason: format!("{name} has length {got}, data axis has length {expected}"),
        });
    }
    Ok(())
}

impl ColocatedData {
    // ----- Construction -----

    /// Wraps a raw array without coordinates.
    ///
    /// The array must be 3-D (point) or 4-D (grid) with a first axis of
    /// length 2.
    pub fn from_array(data: ArrayD<f64>) -> Result<Self, ColocatedDataError> {
        match data.ndim() {
            3 | 4 => {}
            n => {
                return Err(ColocatedDataError::DataDimension {
                    reason: format!("expected 3 or 4 dimensions, got {n}"),
                });
            }
        }
        if data.shape()[0] != 2 {
            return Err(ColocatedDataError::DataDimension {
                reason: format!("first axis must have length 2, got {}", data.shape()[0]),
            });
        }
        Ok(Self {
            data: data.as_standard_layout().into_owned(),
            time: None,
            station_name: None,
            latitude: None,
            longitude: None,
            altitude: None,
            country: None,
            meta: ColocationMeta::default(),
        })
    }

    /// Builds a station container from `(2, time, station)` data.
    pub fn point(
        data: Array3<f64>,
        time: Vec<NaiveDateTime>,
        station_name: Vec<String>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        meta: ColocationMeta,
    ) -> Result<Self, ColocatedDataError> {
        let mut out = Self::from_array(data.into_dyn())?;
        let (nt, ns) = (out.data.shape()[1], out.data.shape()[2]);
        check_len("time", nt, time.len())?;
        check_len("station_name", ns, station_name.len())?;
        check_len("latitude", ns, latitude.len())?;
        check_len("longitude", ns, longitude.len())?;
        out.time = Some(time);
        out.station_name = Some(station_name);
        out.latitude = Some(latitude);
        out.longitude = Some(longitude);
        out.meta = meta;
        Ok(out)
    }

    /// Builds a gridded container from `(2, time, latitude, longitude)` data.
    pub fn grid(
        data: Array4<f64>,
        time: Vec<NaiveDateTime>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        meta: ColocationMeta,
    ) -> Result<Self, ColocatedDataError> {
        let mut out = Self::from_array(data.into_dyn())?;
        let shape = out.data.shape().to_vec();
        check_len("time", shape[1], time.len())?;
        check_len("latitude", shape[2], latitude.len())?;
        check_len("longitude", shape[3], longitude.len())?;
        out.time = Some(time);
        out.latitude = Some(latitude);
        out.longitude = Some(longitude);
        out.meta = meta;
        Ok(out)
    }

    /// Attaches station altitudes (point layout only).
    pub fn with_altitude(mut self, altitude: Vec<f64>) -> Result<Self, ColocatedDataError> {
        self.require_point("altitude")?;
        check_len("altitude", self.num_coords(), altitude.len())?;
        self.altitude = Some(altitude);
        Ok(self)
    }

    /// Attaches station country names (point layout only).
    pub fn with_country(mut self, country: Vec<String>) -> Result<Self, ColocatedDataError> {
        self.require_point("country")?;
        check_len("country", self.num_coords(), country.len())?;
        self.country = Some(country);
        Ok(self)
    }

    pub fn with_meta(mut self, meta: ColocationMeta) -> Self {
        self.meta = meta;
        self
    }

    // ----- Raw access -----

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn meta(&self) -> &ColocationMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ColocationMeta {
        &mut self.meta
    }

    pub fn layout(&self) -> Layout {
        if self.data.ndim() == 4 {
            Layout::Grid
        } else {
            Layout::Point
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of time steps.
    pub fn num_times(&self) -> usize {
        self.data.shape()[1]
    }

    /// Reference (observation) values, without the data-source axis.
    pub fn ref_data(&self) -> ndarray::ArrayViewD<'_, f64> {
        self.data.index_axis(Axis(0), 0)
    }

    /// Model values, without the data-source axis.
    pub fn model_data(&self) -> ndarray::ArrayViewD<'_, f64> {
        self.data.index_axis(Axis(0), 1)
    }

    // ----- Properties -----

    pub fn data_source(&self) -> Result<&[String; 2], ColocatedDataError> {
        if self.meta.data_source.iter().any(String::is_empty) {
            return Err(ColocatedDataError::MissingAttribute {
                name: "data_source",
            });
        }
        Ok(&self.meta.data_source)
    }

    pub fn var_name(&self) -> Result<&[String; 2], ColocatedDataError> {
        if self.meta.var_name.iter().any(String::is_empty) {
            return Err(ColocatedDataError::MissingAttribute { name: "var_name" });
        }
        Ok(&self.meta.var_name)
    }

    pub fn time(&self) -> Result<&[NaiveDateTime], ColocatedDataError> {
        self.time
            .as_deref()
            .ok_or(ColocatedDataError::MissingAttribute { name: "time" })
    }

    pub fn latitude(&self) -> Result<&[f64], ColocatedDataError> {
        self.latitude
            .as_deref()
            .ok_or(ColocatedDataError::MissingAttribute { name: "latitude" })
    }

    pub fn longitude(&self) -> Result<&[f64], ColocatedDataError> {
        self.longitude
            .as_deref()
            .ok_or(ColocatedDataError::MissingAttribute { name: "longitude" })
    }

    pub fn station_name(&self) -> Result<&[String], ColocatedDataError> {
        self.station_name
            .as_deref()
            .ok_or(ColocatedDataError::MissingAttribute {
                name: "station_name",
            })
    }

    pub fn altitude(&self) -> Result<&[f64], ColocatedDataError> {
        self.altitude
            .as_deref()
            .ok_or(ColocatedDataError::MissingAttribute { name: "altitude" })
    }

    pub fn country(&self) -> Result<&[String], ColocatedDataError> {
        self.country
            .as_deref()
            .ok_or(ColocatedDataError::MissingAttribute { name: "country" })
    }

    /// `(min, max)` of the latitude coordinate, ignoring NaN.
    pub fn lat_range(&self) -> Result<(f64, f64), ColocatedDataError> {
        value_range(self.latitude()?, "latitude")
    }

    /// `(min, max)` of the longitude coordinate, ignoring NaN.
    pub fn lon_range(&self) -> Result<(f64, f64), ColocatedDataError> {
        value_range(self.longitude()?, "longitude")
    }

    pub fn ts_type(&self) -> Result<TsType, ColocatedDataError> {
        self.meta
            .ts_type
            .ok_or(ColocatedDataError::MissingAttribute { name: "ts_type" })
    }

    /// Units of `[reference, model]`.
    pub fn units(&self) -> Result<[&str; 2], ColocatedDataError> {
        match &self.meta.var_units {
            [Some(r), Some(m)] => Ok([r.as_str(), m.as_str()]),
            _ => Err(ColocatedDataError::MissingAttribute { name: "var_units" }),
        }
    }

    /// Number of spatial points (stations or grid cells).
    pub fn num_coords(&self) -> usize {
        self.data.shape()[2..].iter().product()
    }

    /// Number of spatial points with at least one time step where both
    /// sides are valid.
    pub fn num_coords_with_data(&self) -> usize {
        let Ok(flat) = self.flat() else {
            return 0;
        };
        (0..flat.shape()[2])
            .filter(|&p| {
                flat.slice(s![0, .., p])
                    .iter()
                    .zip(flat.slice(s![1, .., p]).iter())
                    .any(|(r, m)| !r.is_nan() && !m.is_nan())
            })
            .count()
    }

    // ----- Statistics -----

    /// Statistics over all pairs in the container.
    ///
    /// With `use_area_weights` every pair of a grid is weighted by the cosine
    /// of its latitude. Point data is always unweighted.
    pub fn calc_statistics(
        &self,
        use_area_weights: bool,
        config: &StatisticsConfig,
    ) -> Result<StatsDict, ColocatedDataError> {
        let ref_vals: Vec<f64> = self.ref_data().iter().copied().collect();
        let model_vals: Vec<f64> = self.model_data().iter().copied().collect();
        let weights = if use_area_weights {
            self.pair_weights()?
        } else {
            None
        };
        let mut stats =
            calculate_statistics(&model_vals, &ref_vals, weights.as_deref(), config)?;
        self.add_coord_counts(&mut stats);
        Ok(stats)
    }

    /// Statistics of the spatially aggregated time series.
    ///
    /// Each time step is first collapsed over all spatial points with
    /// `aggr`, ignoring points where either side is missing.
    pub fn calc_temporal_statistics(
        &self,
        aggr: Aggregate,
        config: &StatisticsConfig,
    ) -> Result<StatsDict, ColocatedDataError> {
        let flat = self.flat()?;
        let (nt, np) = (flat.shape()[1], flat.shape()[2]);
        let mut ref_vals = Vec::with_capacity(nt);
        let mut model_vals = Vec::with_capacity(nt);
        for t in 0..nt {
            let (r, m) = joint_valid((0..np).map(|p| (flat[[0, t, p]], flat[[1, t, p]])));
            ref_vals.push(aggr.apply(&r));
            model_vals.push(aggr.apply(&m));
        }
        let mut stats = calculate_statistics(&model_vals, &ref_vals, None, config)?;
        self.add_coord_counts(&mut stats);
        Ok(stats)
    }

    /// Statistics across spatial points of the temporally aggregated data.
    ///
    /// Each point is first collapsed over time with `aggr`, ignoring steps
    /// where either side is missing. Grid cells are weighted by the cosine of
    /// their latitude when `use_area_weights` is set.
    pub fn calc_spatial_statistics(
        &self,
        aggr: Aggregate,
        use_area_weights: bool,
        config: &StatisticsConfig,
    ) -> Result<StatsDict, ColocatedDataError> {
        let flat = self.flat()?;
        let (nt, np) = (flat.shape()[1], flat.shape()[2]);
        let mut ref_vals = Vec::with_capacity(np);
        let mut model_vals = Vec::with_capacity(np);
        for p in 0..np {
            let (r, m) = joint_valid((0..nt).map(|t| (flat[[0, t, p]], flat[[1, t, p]])));
            ref_vals.push(aggr.apply(&r));
            model_vals.push(aggr.apply(&m));
        }
        let weights = match (use_area_weights, self.layout()) {
            (true, Layout::Grid) => Some(self.cell_weights()?),
            (true, Layout::Point) => {
                warn!("area weights are only applied to gridded data, ignoring");
                None
            }
            (false, _) => None,
        };
        let mut stats = calculate_statistics(&model_vals, &ref_vals, weights.as_deref(), config)?;
        self.add_coord_counts(&mut stats);
        Ok(stats)
    }

    fn add_coord_counts(&self, stats: &mut StatsDict) {
        stats.insert(NUM_COORDS_TOT, self.num_coords() as f64);
        stats.insert(NUM_COORDS_WITH_DATA, self.num_coords_with_data() as f64);
    }

    /// cos(latitude) per grid cell in `(lat, lon)` row-major order.
    pub(crate) fn cell_weights(&self) -> Result<Vec<f64>, ColocatedDataError> {
        let lat = self.latitude()?;
        let nlon = self.data.shape()[3];
        Ok(lat
            .iter()
            .flat_map(|l| std::iter::repeat_n(l.to_radians().cos(), nlon))
            .collect())
    }

    fn pair_weights(&self) -> Result<Option<Vec<f64>>, ColocatedDataError> {
        if self.layout() == Layout::Point {
            warn!("area weights are only applied to gridded data, ignoring");
            return Ok(None);
        }
        let cells = self.cell_weights()?;
        Ok(Some(
            (0..self.num_times())
                .flat_map(|_| cells.iter().copied())
                .collect(),
        ))
    }

    // ----- Layout helpers -----

    pub(crate) fn require_point(&self, operation: &'static str) -> Result<(), ColocatedDataError> {
        match self.layout() {
            Layout::Point => Ok(()),
            Layout::Grid => Err(ColocatedDataError::NotImplemented {
                operation,
                layout: Layout::Grid.name(),
            }),
        }
    }

    /// Copy of the data as `(2, time, point)`; grid cells are numbered
    /// row-major over `(lat, lon)`.
    pub fn flat(&self) -> Result<Array3<f64>, ColocatedDataError> {
        let (nt, np) = (self.num_times(), self.num_coords());
        Ok(self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((2, nt, np))?)
    }

    /// Replaces data and time from a `(2, time, point)` array, keeping the
    /// spatial shape.
    pub(crate) fn set_flat(
        &mut self,
        flat: Array3<f64>,
        time: Vec<NaiveDateTime>,
    ) -> Result<(), ColocatedDataError> {
        let mut shape = self.data.shape().to_vec();
        shape[1] = flat.shape()[1];
        check_len("time", shape[1], time.len())?;
        self.data = flat.into_dyn().into_shape_with_order(IxDyn(&shape))?;
        self.time = Some(time);
        Ok(())
    }

    /// `(lat, lon)` of every spatial point in flat order.
    pub(crate) fn point_coords(&self) -> Result<Vec<(f64, f64)>, ColocatedDataError> {
        let lat = self.latitude()?;
        let lon = self.longitude()?;
        Ok(match self.layout() {
            Layout::Point => lat.iter().copied().zip(lon.iter().copied()).collect(),
            Layout::Grid => lat
                .iter()
                .flat_map(|la| lon.iter().map(move |lo| (*la, *lo)))
                .collect(),
        })
    }
}

fn value_range(values: &[f64], name: &'static str) -> Result<(f64, f64), ColocatedDataError> {
    let mut valid = values.iter().copied().filter(|v| !v.is_nan()).peekable();
    if valid.peek().is_none() {
        return Err(ColocatedDataError::MissingAttribute { name });
    }
    Ok(valid.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    }))
}

fn joint_valid(pairs: impl Iterator<Item = (f64, f64)>) -> (Vec<f64>, Vec<f64>) {
    pairs.filter(|(r, m)| !r.is_nan() && !m.is_nan()).unzip()
}
