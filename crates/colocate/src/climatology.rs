//! Monthly observation climatologies.

use std::collections::BTreeMap;

use aerocol_resample::{Aggregation, ResampleConfig, TimeSeries};
use aerocol_tstype::{BaseFreq, TsType};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::align::series_to_target;
use crate::error::ColocateError;
use crate::options::ClimatologyOptions;
use crate::station::StationData;

fn year_bounds(start_year: i32, stop_year: i32) -> Result<(NaiveDateTime, NaiveDateTime), ColocateError> {
    let start = NaiveDate::from_ymd_opt(start_year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let stop = NaiveDate::from_ymd_opt(stop_year, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59));
    match (start, stop) {
        (Some(start), Some(stop)) => Ok((start, stop)),
        _ => Err(ColocateError::Setup {
            reason: format!("invalid climatology years {start_year} - {stop_year}"),
        }),
    }
}

/// Monthly climatology of one series, labelled in `year`.
///
/// The series is resampled to monthly with `config`, then each calendar
/// month is averaged over the years of `clim`. Months with fewer than
/// `clim.min_count` valid years are NaN.
pub fn monthly_climatology(
    series: &TimeSeries,
    from: &TsType,
    clim: &ClimatologyOptions,
    year: i32,
    config: &ResampleConfig,
) -> Result<TimeSeries, ColocateError> {
    let monthly = TsType::base_only(BaseFreq::Monthly);
    let (start, stop) = year_bounds(clim.start_year, clim.stop_year)?;
    let cropped = series.crop(start, stop);
    let resampled = series_to_target(&cropped, from, &monthly, config)?;

    let mut per_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (t, v) in resampled.time().iter().zip(resampled.values()) {
        if !v.is_nan() {
            per_month.entry(t.month()).or_default().push(*v);
        }
    }
    let (first, last) = year_bounds(year, year)?;
    let index = monthly.time_index(first, last)?;
    let values = index
        .iter()
        .map(|t| match per_month.get(&t.month()) {
            Some(valid) if valid.len() >= clim.min_count as usize => Aggregation::Mean.apply(valid),
            _ => f64::NAN,
        })
        .collect();
    Ok(TimeSeries::new(index, values)?)
}

/// Replaces `var_name` of every station by its monthly climatology in `year`.
///
/// Stations without the variable are dropped.
pub fn stations_to_climatology(
    stations: &[StationData],
    var_name: &str,
    clim: &ClimatologyOptions,
    year: i32,
    config: &ResampleConfig,
) -> Result<Vec<StationData>, ColocateError> {
    let monthly = TsType::base_only(BaseFreq::Monthly);
    let mut out = Vec::with_capacity(stations.len());
    for st in stations {
        let Some(series) = st.series.get(var_name) else {
            continue;
        };
        let clim_series = monthly_climatology(series, &st.ts_type, clim, year, config)?;
        debug!(
            station = %st.station_name,
            valid_months = clim_series.num_valid(),
            "observation climatology"
        );
        let mut s = st.clone();
        s.ts_type = monthly;
        s.series.insert(var_name.to_string(), clim_series);
        out.push(s);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_series(years: std::ops::RangeInclusive<i32>) -> TimeSeries {
        let mut time = Vec::new();
        let mut values = Vec::new();
        for y in years {
            let mut d = NaiveDate::from_ymd_opt(y, 1, 1).unwrap();
            while d.year() == y {
                time.push(d.and_hms_opt(0, 0, 0).unwrap());
                values.push(f64::from(d.month()) + f64::from(y - 2000));
                d = d.succ_opt().unwrap();
            }
        }
        TimeSeries::new(time, values).unwrap()
    }

    #[test]
    fn averages_calendar_months() {
        let clim = ClimatologyOptions {
            start_year: 2005,
            stop_year: 2009,
            min_count: 5,
        };
        let s = daily_series(2005..=2009);
        let out = monthly_climatology(&s, &"daily".parse().unwrap(), &clim, 2012, &ResampleConfig::new())
            .unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(out.time()[0].year(), 2012);
        assert!((out.values()[0] - 8.0).abs() < 1e-12);
        assert!((out.values()[11] - 19.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_years_is_nan() {
        let clim = ClimatologyOptions {
            start_year: 2005,
            stop_year: 2015,
            min_count: 5,
        };
        let s = daily_series(2005..=2007);
        let out = monthly_climatology(&s, &"daily".parse().unwrap(), &clim, 2012, &ResampleConfig::new())
            .unwrap();
        assert_eq!(out.num_valid(), 0);
    }
}
