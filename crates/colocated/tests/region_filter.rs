//! Latitude/longitude filtering, including boxes crossing the antimeridian.

use aerocol_colocated::{ColocatedData, ColocatedDataError, ColocationMeta, Region};
use chrono::NaiveDate;
use ndarray::{Array3, Array4};

fn eight_stations() -> ColocatedData {
    let lons = vec![-160.0, -100.0, -50.0, 0.0, 10.0, 20.0, 25.0, -175.0];
    let lats = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 45.0, -20.0];
    let names: Vec<String> = (0..8).map(|i| format!("station{i}")).collect();
    let time = vec![
        NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    ];
    let data = Array3::from_shape_fn((2, 1, 8), |(src, _, s)| (s + src) as f64);
    ColocatedData::point(
        data,
        time,
        names,
        lats,
        lons,
        ColocationMeta::new("obs", "model", "od550aer", "od550aer"),
    )
    .unwrap()
    .with_country(vec![
        "USA".into(),
        "USA".into(),
        "Brazil".into(),
        "Spain".into(),
        "Germany".into(),
        "Norway".into(),
        "Italy".into(),
        "Fiji".into(),
    ])
    .unwrap()
}

#[test]
fn antimeridian_region_keeps_two_stations() {
    let region = Region::new("custom", (-90.0, 90.0), (22.0, -170.0));
    let filtered = eight_stations().apply_latlon_filter(&region).unwrap();
    assert_eq!(filtered.num_coords(), 2);
    assert_eq!(filtered.station_name().unwrap(), &["station6", "station7"]);
    assert_eq!(filtered.meta().filter_name.as_deref(), Some("custom"));
    assert_eq!(filtered.data()[[1, 0, 1]], 8.0);
}

#[test]
fn predefined_region() {
    let filtered = eight_stations().filter_region("EUROPE", false).unwrap();
    assert_eq!(filtered.num_coords(), 4);
    assert_eq!(filtered.country().unwrap()[0], "Spain");
}

#[test]
fn country_filter() {
    let filtered = eight_stations().filter_region("usa", true).unwrap();
    assert_eq!(filtered.num_coords(), 2);
    assert_eq!(filtered.get_country_codes().unwrap(), vec!["USA".to_string()]);
    assert!(matches!(
        eight_stations().filter_region("Chile", true),
        Err(ColocatedDataError::DataCoverage { .. })
    ));
}

#[test]
fn country_codes_sorted_unique() {
    let codes = eight_stations().get_country_codes().unwrap();
    assert_eq!(codes.len(), 7);
    assert_eq!(codes[0], "Brazil");
}

#[test]
fn unknown_region_name() {
    assert!(matches!(
        eight_stations().filter_region("MORDOR", false),
        Err(ColocatedDataError::UnknownRegion { .. })
    ));
}

fn small_grid() -> ColocatedData {
    let time = vec![
        NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    ];
    ColocatedData::grid(
        Array4::from_elem((2, 1, 3, 4), 1.0),
        time,
        vec![-45.0, 0.0, 45.0],
        vec![-135.0, -45.0, 45.0, 135.0],
        ColocationMeta::new("obs", "model", "od550aer", "od550aer"),
    )
    .unwrap()
}

#[test]
fn grid_box_filter() {
    let region = Region::new("box", (-10.0, 60.0), (0.0, 180.0));
    let filtered = small_grid().apply_latlon_filter(&region).unwrap();
    assert_eq!(filtered.shape(), &[2, 1, 2, 2]);
    assert_eq!(filtered.latitude().unwrap(), &[0.0, 45.0]);
    assert_eq!(filtered.longitude().unwrap(), &[45.0, 135.0]);
}

#[test]
fn grid_antimeridian_unsupported() {
    let region = Region::new("custom", (-90.0, 90.0), (22.0, -170.0));
    assert!(matches!(
        small_grid().apply_latlon_filter(&region),
        Err(ColocatedDataError::DataCoverage { .. })
    ));
}

#[test]
fn grid_empty_region_is_coverage_error() {
    let region = Region::new("tiny", (80.0, 85.0), (0.0, 10.0));
    assert!(matches!(
        small_grid().apply_latlon_filter(&region),
        Err(ColocatedDataError::DataCoverage { .. })
    ));
}
