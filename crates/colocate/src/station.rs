//! Station (point) observations.

use std::collections::BTreeMap;

use aerocol_colocated::VerticalLayer;
use aerocol_resample::TimeSeries;
use aerocol_tstype::TsType;
use chrono::NaiveDateTime;
use ndarray::Array2;

use crate::error::ColocateError;
use crate::units::convert_values;

/// Time-by-altitude measurements of one variable at a station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationProfile {
    pub time: Vec<NaiveDateTime>,
    /// Altitude of each bin in metres.
    pub altitude: Vec<f64>,
    /// `(time, altitude)` values.
    pub values: Array2<f64>,
}

impl StationProfile {
    pub fn new(
        time: Vec<NaiveDateTime>,
        altitude: Vec<f64>,
        values: Array2<f64>,
    ) -> Result<Self, ColocateError> {
        if values.dim() != (time.len(), altitude.len()) {
            return Err(ColocateError::DataDimension {
                reason: format!(
                    "profile values have shape {:?}, expected ({}, {})",
                    values.dim(),
                    time.len(),
                    altitude.len()
                ),
            });
        }
        Ok(Self {
            time,
            altitude,
            values,
        })
    }

    /// Mean over the altitude bins inside `layer` at every time step.
    pub fn layer_mean(&self, layer: &VerticalLayer) -> Result<TimeSeries, ColocateError> {
        let values = self
            .values
            .outer_iter()
            .map(|row| {
                let (sum, n) = row
                    .iter()
                    .zip(&self.altitude)
                    .filter(|(v, a)| layer.contains(**a) && !v.is_nan())
                    .fold((0.0, 0usize), |(s, n), (v, _)| (s + v, n + 1));
                if n > 0 { sum / n as f64 } else { f64::NAN }
            })
            .collect();
        Ok(TimeSeries::new(self.time.clone(), values)?)
    }
}

/// Observations of one station in one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct StationData {
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in metres.
    pub altitude: f64,
    pub country: Option<String>,
    /// Dataset (network) the station belongs to.
    pub dataset: String,
    pub ts_type: TsType,
    pub series: BTreeMap<String, TimeSeries>,
    pub units: BTreeMap<String, String>,
    pub profiles: BTreeMap<String, StationProfile>,
}

impl StationData {
    pub fn new(
        station_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        dataset: impl Into<String>,
        ts_type: TsType,
    ) -> Self {
        Self {
            station_name: station_name.into(),
            latitude,
            longitude,
            altitude,
            country: None,
            dataset: dataset.into(),
            ts_type,
            series: BTreeMap::new(),
            units: BTreeMap::new(),
            profiles: BTreeMap::new(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Adds a surface time series for `var_name`.
    pub fn with_series(
        mut self,
        var_name: impl Into<String>,
        series: TimeSeries,
        units: Option<&str>,
    ) -> Self {
        let var_name = var_name.into();
        if let Some(u) = units {
            self.units.insert(var_name.clone(), u.to_string());
        }
        self.series.insert(var_name, series);
        self
    }

    /// Adds a vertical profile for `var_name`.
    pub fn with_profile(
        mut self,
        var_name: impl Into<String>,
        profile: StationProfile,
        units: Option<&str>,
    ) -> Self {
        let var_name = var_name.into();
        if let Some(u) = units {
            self.units.insert(var_name.clone(), u.to_string());
        }
        self.profiles.insert(var_name, profile);
        self
    }

    pub fn has_var(&self, var_name: &str) -> bool {
        self.series.contains_key(var_name) || self.profiles.contains_key(var_name)
    }

    pub fn units_of(&self, var_name: &str) -> Option<&str> {
        self.units.get(var_name).map(String::as_str)
    }

    /// First and last timestamp of `var_name`.
    pub fn time_range(&self, var_name: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let time = match self.series.get(var_name) {
            Some(s) => s.time(),
            None => &self.profiles.get(var_name)?.time,
        };
        Some((*time.first()?, *time.last()?))
    }

    /// Applies `f` to every value of `var_name`, series and profile alike.
    fn map_values(&mut self, var_name: &str, f: impl Fn(f64) -> f64) -> Result<(), ColocateError> {
        if let Some(series) = self.series.get_mut(var_name) {
            let (time, values) = std::mem::take(series).into_parts();
            *series = TimeSeries::new(time, values.into_iter().map(&f).collect())?;
        }
        if let Some(profile) = self.profiles.get_mut(var_name) {
            profile.values.mapv_inplace(&f);
        }
        Ok(())
    }

    pub fn remove_outliers(&mut self, var_name: &str, low: f64, high: f64) -> Result<(), ColocateError> {
        self.map_values(var_name, |v| if v < low || v > high { f64::NAN } else { v })
    }

    pub fn set_zeros_nan(&mut self, var_name: &str) -> Result<(), ColocateError> {
        self.map_values(var_name, |v| if v == 0.0 { f64::NAN } else { v })
    }

    /// Converts `var_name` to `to`; a variable without units is left as is.
    pub fn convert_units(&mut self, var_name: &str, to: &str) -> Result<(), ColocateError> {
        let Some(from) = self.units.get(var_name).cloned() else {
            return Ok(());
        };
        if let Some(series) = self.series.get_mut(var_name) {
            let (time, mut values) = std::mem::take(series).into_parts();
            convert_values(&mut values, &from, to)?;
            *series = TimeSeries::new(time, values)?;
        }
        if let Some(profile) = self.profiles.get_mut(var_name) {
            let factor = crate::units::conversion_factor(&from, to)?;
            profile.values.mapv_inplace(|v| v * factor);
        }
        self.units.insert(var_name.to_string(), to.to_string());
        Ok(())
    }
}
