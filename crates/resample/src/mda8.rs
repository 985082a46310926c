//! Maximum daily 8-hour mean.

use std::collections::BTreeMap;

use aerocol_tstype::{BaseFreq, TsType};
use chrono::{NaiveDateTime, TimeDelta};

use crate::error::ResampleError;
use crate::how::Aggregation;
use crate::resample::{ResampleStep, resample_step};
use crate::series::TimeSeries;

/// Hours in the rolling window of one day.
const WINDOWS_PER_DAY: usize = 24;

/// Parameters of the MDA8 calculation.
///
/// # Example
///
/// ```
/// use aerocol_resample::Mda8Config;
///
/// let config = Mda8Config::new().with_daily_min(16);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mda8Config {
    window: usize,
    window_min: usize,
    daily_min: usize,
}

impl Mda8Config {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `window = 8`, `window_min = 6`, `daily_min = 18` (of 24
    /// windows per day).
    pub fn new() -> Self {
        Self {
            window: 8,
            window_min: 6,
            daily_min: 18,
        }
    }

    /// Sets the rolling window length in hours.
    pub fn with_window(mut self, hours: usize) -> Self {
        self.window = hours;
        self
    }

    /// Sets the valid hours required for a window mean.
    pub fn with_window_min(mut self, n: usize) -> Self {
        self.window_min = n;
        self
    }

    /// Sets the valid window means required per day.
    pub fn with_daily_min(mut self, n: usize) -> Self {
        self.daily_min = n;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn window_min(&self) -> usize {
        self.window_min
    }

    pub fn daily_min(&self) -> usize {
        self.daily_min
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ResampleError> {
        if self.window == 0 {
            return Err(ResampleError::InvalidConfig {
                reason: "window must be >= 1".to_string(),
            });
        }
        if self.window_min == 0 || self.window_min > self.window {
            return Err(ResampleError::InvalidConfig {
                reason: format!(
                    "window_min must be in 1..={}, got {}",
                    self.window, self.window_min
                ),
            });
        }
        if self.daily_min > WINDOWS_PER_DAY {
            return Err(ResampleError::InvalidConfig {
                reason: format!(
                    "daily_min must be <= {WINDOWS_PER_DAY}, got {}",
                    self.daily_min
                ),
            });
        }
        Ok(())
    }
}

impl Default for Mda8Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Trailing rolling mean over a dense hourly series.
///
/// The value at hour `i` averages hours `i - window + 1 ..= i` (clipped at
/// the start) and is NaN with fewer than `window_min` valid hours.
pub fn rolling_mean(values: &[f64], window: usize, window_min: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let lo = (i + 1).saturating_sub(window);
            let valid: Vec<f64> = values[lo..=i]
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            if valid.len() >= window_min {
                Aggregation::Mean.apply(&valid)
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Daily maximum of 8-hour trailing means for hourly input.
///
/// A window is labelled by its last hour. Day `D` collects the windows
/// labelled in `(D 00:00, D+1 00:00]`, so its first window ends at 01:00 and
/// its last at 24:00. A day is NaN unless at least `daily_min` of those
/// windows are valid. One value is returned per calendar day spanned by the
/// input, labelled at midnight.
pub fn mda8(series: &TimeSeries, config: &Mda8Config) -> Result<TimeSeries, ResampleError> {
    config.validate()?;
    let hourly = resample_step(
        series,
        &ResampleStep {
            to: TsType::base_only(BaseFreq::Hourly),
            min_count: 1,
            how: Aggregation::Mean,
        },
    )?;
    if hourly.is_empty() {
        return Ok(hourly);
    }
    let rolled = rolling_mean(hourly.values(), config.window, config.window_min);

    let daily = TsType::base_only(BaseFreq::Daily);
    let hours = hourly.time();
    let mut per_day: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
    for (t, v) in hours.iter().zip(&rolled) {
        if !v.is_nan() {
            per_day
                .entry(daily.floor(*t - TimeDelta::hours(1))?)
                .or_default()
                .push(*v);
        }
    }
    let days = daily.time_index(hours[0], hours[hours.len() - 1])?;
    let values = days
        .iter()
        .map(|day| match per_day.get(day) {
            Some(valid) if valid.len() >= config.daily_min => Aggregation::Max.apply(valid),
            _ => f64::NAN,
        })
        .collect();
    TimeSeries::new(days, values)
}
