//! Construction and property access of colocated containers.

use aerocol_colocated::{ColocatedData, ColocatedDataError, ColocationMeta, Layout};
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{Array3, ArrayD, IxDyn};

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 6, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn station_data() -> ColocatedData {
    let mut data = Array3::<f64>::from_elem((2, 3, 2), 1.0);
    data[[0, 0, 1]] = f64::NAN;
    data[[1, 1, 1]] = f64::NAN;
    data[[0, 2, 1]] = f64::NAN;
    ColocatedData::point(
        data,
        vec![day(1), day(2), day(3)],
        vec!["Alpha".to_string(), "Beta".to_string()],
        vec![45.0, -10.0],
        vec![5.0, 120.0],
        ColocationMeta::new("EBAS", "CAMS", "concpm10", "concpm10")
            .with_ts_type("daily".parse().unwrap())
            .with_units(Some("ug m-3".to_string()), Some("ug m-3".to_string())),
    )
    .unwrap()
}

#[test]
fn raw_array_must_have_two_sources() {
    let err = ColocatedData::from_array(ArrayD::zeros(IxDyn(&[3, 4, 5]))).unwrap_err();
    assert!(matches!(err, ColocatedDataError::DataDimension { .. }));
}

#[test]
fn raw_array_rank_checked() {
    let err = ColocatedData::from_array(ArrayD::zeros(IxDyn(&[2, 4]))).unwrap_err();
    assert!(matches!(err, ColocatedDataError::DataDimension { .. }));
    assert!(ColocatedData::from_array(ArrayD::zeros(IxDyn(&[2, 4, 3, 3]))).is_ok());
}

#[test]
fn raw_array_has_no_coordinates() {
    let cd = ColocatedData::from_array(ArrayD::zeros(IxDyn(&[2, 4, 5]))).unwrap();
    assert_eq!(cd.layout(), Layout::Point);
    assert!(matches!(
        cd.latitude(),
        Err(ColocatedDataError::MissingAttribute { name: "latitude" })
    ));
    assert!(matches!(
        cd.ts_type(),
        Err(ColocatedDataError::MissingAttribute { name: "ts_type" })
    ));
    assert!(cd.data_source().is_err());
    assert_eq!(cd.num_coords(), 5);
}

#[test]
fn coordinate_length_checked() {
    let err = ColocatedData::point(
        Array3::zeros((2, 3, 2)),
        vec![day(1), day(2)],
        vec!["a".to_string(), "b".to_string()],
        vec![0.0, 0.0],
        vec![0.0, 0.0],
        ColocationMeta::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ColocatedDataError::DataDimension { .. }));
}

#[test]
fn properties() {
    let cd = station_data();
    assert_eq!(cd.data_source().unwrap()[0], "EBAS");
    assert_eq!(cd.var_name().unwrap()[1], "concpm10");
    assert_eq!(cd.lat_range().unwrap(), (-10.0, 45.0));
    assert_eq!(cd.lon_range().unwrap(), (5.0, 120.0));
    assert_eq!(cd.units().unwrap(), ["ug m-3", "ug m-3"]);
    assert_eq!(cd.ts_type().unwrap().to_string(), "daily");
    assert_eq!(cd.num_coords(), 2);
}

#[test]
fn station_without_valid_pair_not_counted() {
    assert_eq!(station_data().num_coords_with_data(), 1);
}

#[test]
fn zeros_and_outliers() {
    let mut cd = station_data();
    cd.remove_outliers(None, Some(0.5));
    assert!(cd.data().iter().all(|v| v.is_nan()));

    let mut cd = station_data();
    cd.set_zeros_nan();
    assert!(cd.meta().zeros_to_nan);
}

#[test]
fn rename_variable() {
    let mut cd = station_data();
    cd.rename_variable("concpm10", "pm10").unwrap();
    assert_eq!(cd.var_name().unwrap(), &["pm10".to_string(), "pm10".to_string()]);
    assert!(matches!(
        cd.rename_variable("od550aer", "x"),
        Err(ColocatedDataError::UnknownVariable { .. })
    ));
}

#[test]
fn table_roundtrip() {
    let cd = station_data();
    let table = cd.to_table().unwrap();
    assert_eq!(table.rows.len(), 6);
    let back = ColocatedData::from_table(&table).unwrap();
    assert_eq!(back.station_name().unwrap(), cd.station_name().unwrap());
    assert_eq!(back.time().unwrap(), cd.time().unwrap());
    assert!(back.data()[[0, 0, 1]].is_nan());
    assert_eq!(back.data()[[1, 0, 1]], 1.0);
}

#[test]
fn table_roundtrip_keeps_country() {
    let cd = station_data()
        .with_country(vec!["Norway".to_string(), "Chile".to_string()])
        .unwrap();
    let table = cd.to_table().unwrap();
    assert_eq!(table.rows[1].country.as_deref(), Some("Chile"));
    let back = ColocatedData::from_table(&table).unwrap();
    assert_eq!(back.country().unwrap(), cd.country().unwrap());
    let chile = back.filter_region("Chile", true).unwrap();
    assert_eq!(chile.station_name().unwrap(), &["Beta".to_string()]);
}

#[test]
fn table_without_country_stays_without() {
    let back = ColocatedData::from_table(&station_data().to_table().unwrap()).unwrap();
    assert!(matches!(
        back.country(),
        Err(ColocatedDataError::MissingAttribute { name: "country" })
    ));
}

#[test]
fn grid_table_not_implemented() {
    let cd = ColocatedData::from_array(ArrayD::zeros(IxDyn(&[2, 1, 2, 2]))).unwrap();
    assert!(matches!(
        cd.to_table(),
        Err(ColocatedDataError::NotImplemented { .. })
    ));
}

#[test]
fn area_weights_need_grid() {
    assert!(matches!(
        station_data().area_weights(),
        Err(ColocatedDataError::DataDimension { .. })
    ));
}

#[test]
fn coords_valid_obs() {
    let (lat, lon) = station_data().get_coords_valid_obs().unwrap();
    assert_eq!(lat, vec![45.0, -10.0]);
    assert_eq!(lon, vec![5.0, 120.0]);
}
