//! Gridded vs gridded colocation.

use aerocol_colocate::{ColocateError, ColocationOptions, GriddedData, colocate_gridded_gridded, stack_gridded};
use aerocol_colocated::{ColocationMeta, Layout};
use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use ndarray::Array3;

fn days(year: i32, n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    (0..n).map(|d| start + TimeDelta::days(d as i64)).collect()
}

/// Daily field on a 2 x 4 global grid for January of `year`.
fn field(id: &str, year: i32, units: &str, f: impl Fn(usize, usize, usize) -> f64) -> GriddedData {
    GriddedData::surface(
        id,
        "concpm10",
        "daily".parse().unwrap(),
        days(year, 31),
        vec![-45.0, 45.0],
        vec![-135.0, -45.0, 45.0, 135.0],
        Array3::from_shape_fn((31, 2, 4), |(t, i, j)| f(t, i, j)),
    )
    .unwrap()
    .with_units(units)
}

fn cell(_: usize, i: usize, j: usize) -> f64 {
    1.0 + (i * 4 + j) as f64
}

#[test]
fn identical_grids_monthly() {
    let obs = field("obs", 2010, "ug m-3", cell);
    let model = field("model", 2010, "ug m-3", |t, i, j| 2.0 * cell(t, i, j));
    let opts = ColocationOptions::new().with_ts_type(Some("monthly".parse().unwrap()));
    let cd = colocate_gridded_gridded(&model, &obs, &opts).unwrap();

    assert_eq!(cd.layout(), Layout::Grid);
    assert_eq!(cd.shape(), &[2, 1, 2, 4]);
    assert_relative_eq!(cd.data()[[0, 0, 1, 2]], 7.0);
    assert_relative_eq!(cd.data()[[1, 0, 1, 2]], 14.0);
    assert_eq!(cd.data_source().unwrap(), &["obs".to_string(), "model".to_string()]);
    assert_eq!(cd.ts_type().unwrap(), "monthly".parse().unwrap());
    assert_eq!(cd.meta().ts_type_src[0], Some("daily".parse().unwrap()));
    assert_eq!(cd.meta().filter_name.as_deref(), Some("WORLD"));
}

/// Mismatched aligned grids are reported, never truncated.
#[test]
fn shape_mismatch_is_colocation_error() {
    let obs = Array3::<f64>::zeros((1, 2, 4));
    let model = Array3::<f64>::zeros((1, 2, 3));
    let err = stack_gridded(
        &obs,
        &model,
        days(2010, 1),
        vec![-45.0, 45.0],
        vec![-135.0, -45.0, 45.0, 135.0],
        ColocationMeta::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ColocateError::Colocation { .. }));
}

#[test]
fn no_time_overlap() {
    let obs = field("obs", 2011, "ug m-3", cell);
    let model = field("model", 2010, "ug m-3", cell);
    let err = colocate_gridded_gridded(&model, &obs, &ColocationOptions::new()).unwrap_err();
    assert!(matches!(err, ColocateError::TimeMatch { .. }));
}

#[test]
fn model_units_converted_to_obs() {
    let obs = field("obs", 2010, "ug m-3", |_, _, _| 1.0);
    let model = field("model", 2010, "ng m-3", |_, _, _| 1000.0);
    let cd = colocate_gridded_gridded(&model, &obs, &ColocationOptions::new()).unwrap();
    assert_relative_eq!(cd.data()[[1, 3, 0, 0]], 1.0, epsilon = 1e-12);
    assert_eq!(cd.units().unwrap(), ["ug m-3", "ug m-3"]);
}

#[test]
fn incompatible_units() {
    let obs = field("obs", 2010, "ug m-3", cell);
    let model = field("model", 2010, "ppb", cell);
    let err = colocate_gridded_gridded(&model, &obs, &ColocationOptions::new()).unwrap_err();
    assert!(matches!(err, ColocateError::DataUnit { .. }));
}

#[test]
fn region_filter_applied_to_both() {
    let obs = field("obs", 2010, "ug m-3", cell);
    let model = field("model", 2010, "ug m-3", cell);
    let opts = ColocationOptions::new().with_filter_name("EUROPE");
    let cd = colocate_gridded_gridded(&model, &obs, &opts).unwrap();
    assert_eq!(cd.shape(), &[2, 31, 1, 1]);
    assert_eq!(cd.latitude().unwrap(), &[45.0]);
    assert_eq!(cd.longitude().unwrap(), &[45.0]);
    assert_eq!(cd.meta().filter_name.as_deref(), Some("EUROPE"));
}

#[test]
fn regrid_to_common_resolution() {
    let obs = field("obs", 2010, "ug m-3", |_, _, _| 3.0);
    let model = field("model", 2010, "ug m-3", |_, _, _| 6.0);
    let opts = ColocationOptions::new()
        .with_ts_type(Some("monthly".parse().unwrap()))
        .with_regrid_res_deg(Some(180.0));
    let cd = colocate_gridded_gridded(&model, &obs, &opts).unwrap();
    assert_eq!(cd.shape(), &[2, 1, 1, 2]);
    assert_relative_eq!(cd.data()[[0, 0, 0, 1]], 3.0, epsilon = 1e-12);
    assert_relative_eq!(cd.data()[[1, 0, 0, 1]], 6.0, epsilon = 1e-12);
    assert_eq!(cd.meta().regrid_res_deg, Some(180.0));
}

#[test]
fn all_nan_obs_is_colocation_error() {
    let obs = field("obs", 2010, "ug m-3", |_, _, _| f64::NAN);
    let model = field("model", 2010, "ug m-3", cell);
    let err = colocate_gridded_gridded(&model, &obs, &ColocationOptions::new()).unwrap_err();
    assert!(matches!(err, ColocateError::Colocation { .. }));
}
