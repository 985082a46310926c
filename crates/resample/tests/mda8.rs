use aerocol_resample::{Mda8Config, TimeSeries, mda8};
use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn hourly(values: Vec<f64>) -> TimeSeries {
    let time = (0..values.len())
        .map(|i| start() + TimeDelta::hours(i as i64))
        .collect();
    TimeSeries::new(time, values).unwrap()
}

#[test]
fn ramp_over_two_days() {
    let values: Vec<f64> = (0..=48).map(f64::from).collect();
    let out = mda8(&hourly(values), &Mda8Config::new()).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out.time()[0], start());
    assert_relative_eq!(out.values()[0], 20.5, epsilon = 1e-12);
    assert_relative_eq!(out.values()[1], 44.5, epsilon = 1e-12);
    assert!(out.values()[2].is_nan());
}

#[test]
fn sparse_day_is_nan() {
    // Only every third hour is valid: no 8-hour window reaches 6 valid hours.
    let values: Vec<f64> = (0..72)
        .map(|h| if h % 3 == 0 { 40.0 } else { f64::NAN })
        .collect();
    let out = mda8(&hourly(values), &Mda8Config::new()).unwrap();
    assert!(out.values().iter().all(|v| v.is_nan()));
}

#[test]
fn relaxed_daily_threshold() {
    // Day one has 20 valid windows (hours 5..=24) with the default config; a
    // stricter threshold of 21 removes it.
    let values: Vec<f64> = (0..=48).map(f64::from).collect();
    let out = mda8(&hourly(values), &Mda8Config::new().with_daily_min(21)).unwrap();
    assert!(out.values()[0].is_nan());
    assert_relative_eq!(out.values()[1], 44.5, epsilon = 1e-12);
}

#[test]
fn empty_input() {
    let out = mda8(&TimeSeries::default(), &Mda8Config::new()).unwrap();
    assert!(out.is_empty());
}
