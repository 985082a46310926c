//! End-to-end evaluation reports for point and gridded containers.

use aerocol_colocated::{ColocatedData, ColocationMeta, Region};
use aerocol_evaluate::{EvaluateConfig, evaluate, to_json};
use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{Array3, Array4};

fn days(n: u32) -> Vec<NaiveDateTime> {
    (1..=n)
        .map(|d| NaiveDate::from_ymd_opt(2010, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
        .collect()
}

fn meta() -> ColocationMeta {
    ColocationMeta::new("EBAS", "TM5", "concpm10", "concpm10").with_ts_type("daily".parse().unwrap())
}

/// Ispra (Europe), Beijing (Asia) and Cape Grim (Australia, no valid obs).
fn stations() -> ColocatedData {
    let reference = [
        [1.0, 2.0, f64::NAN],
        [2.0, 3.0, f64::NAN],
        [3.0, 4.0, f64::NAN],
        [4.0, 5.0, f64::NAN],
    ];
    let model = [
        [2.0, 5.0, 1.0],
        [4.0, 4.0, 1.0],
        [6.0, 3.0, 1.0],
        [8.0, 2.0, 1.0],
    ];
    let data = Array3::from_shape_fn((2, 4, 3), |(v, t, p)| {
        if v == 0 { reference[t][p] } else { model[t][p] }
    });
    ColocatedData::point(
        data,
        days(4),
        vec!["Ispra".into(), "Beijing".into(), "Cape Grim".into()],
        vec![45.8, 39.9, -40.7],
        vec![8.6, 116.4, 144.7],
        meta(),
    )
    .unwrap()
    .with_altitude(vec![209.0, 44.0, 94.0])
    .unwrap()
}

#[test]
fn test_point_report() {
    let output = evaluate(&stations(), &EvaluateConfig::default()).unwrap();

    assert_eq!(output.regions[0].region, "WORLD");
    assert_eq!(output.regions.len(), Region::default_regions().len() + 1);

    let world = output.region("WORLD").unwrap();
    assert!(!world.dummy);
    assert_eq!(world.stats.num_valid(), 8.0);
    // Per-station R is 1 and -1; Cape Grim has none.
    assert_relative_eq!(world.stats.get("R_temporal_mean").unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(world.stats.get("R_temporal_median").unwrap(), 0.0, epsilon = 1e-12);
    // Per-step spatial R is 1, NaN (constant model), -1, -1.
    assert_relative_eq!(world.stats.get("R_spatial_mean").unwrap(), -1.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(world.stats.get("R_spatial_median").unwrap(), -1.0, epsilon = 1e-12);

    let europe = output.region("EUROPE").unwrap();
    assert!(!europe.dummy);
    assert_eq!(europe.stats.num_valid(), 4.0);
    assert_relative_eq!(europe.stats.get("R").unwrap(), 1.0, epsilon = 1e-12);

    let australia = output.region("AUSTRALIA").unwrap();
    assert!(australia.dummy);
    assert!(australia.stats.get("R").unwrap().is_nan());
    assert!(australia.stats.contains("R_spatial_mean"));

    assert!(output.region("INDIA").unwrap().dummy);
}

#[test]
fn test_station_statistics() {
    let output = evaluate(&stations(), &EvaluateConfig::default()).unwrap();
    assert_eq!(output.stations.len(), 3);
    let ispra = &output.stations[0];
    assert_eq!(ispra.station_name, "Ispra");
    assert_eq!(ispra.altitude, Some(209.0));
    assert_relative_eq!(ispra.stats.get("R").unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(ispra.stats.get("mb").unwrap(), 2.5, epsilon = 1e-12);
    assert_relative_eq!(output.stations[1].stats.get("R").unwrap(), -1.0, epsilon = 1e-12);
    assert_eq!(output.stations[2].stats.num_valid(), 0.0);

    let disabled = EvaluateConfig::default().with_station_statistics(false);
    assert!(evaluate(&stations(), &disabled).unwrap().stations.is_empty());
}

#[test]
fn test_gridded_report() {
    let data = Array4::from_shape_fn((2, 3, 2, 2), |(v, t, y, x)| {
        let base = (t + 2 * y + x) as f64;
        if v == 0 { base } else { 2.0 * base }
    });
    let coldata =
        ColocatedData::grid(data, days(3), vec![-45.0, 45.0], vec![0.0, 90.0], meta()).unwrap();
    let config = EvaluateConfig::default().with_regions(vec![
        Region::get("EUROPE").unwrap(),
        Region::get("RBU").unwrap(),
    ]);

    let output = evaluate(&coldata, &config).unwrap();
    assert_eq!(output.regions.len(), 3);
    assert!(!output.region("WORLD").unwrap().dummy);
    assert_eq!(output.region("WORLD").unwrap().stats.num_valid(), 12.0);
    let europe = output.region("EUROPE").unwrap();
    assert!(!europe.dummy);
    assert_eq!(europe.stats.num_valid(), 3.0);
    // Grid filtering across the antimeridian is unsupported.
    assert!(output.region("RBU").unwrap().dummy);
    assert!(output.stations.is_empty());

    let json = to_json(&output).unwrap();
    assert!(json.contains("\"region\": \"RBU\""));
    assert!(json.contains("\"dummy\": true"));
}

#[test]
fn test_invalid_config_rejected() {
    let config = EvaluateConfig::default().with_regions(vec![Region::get("WORLD").unwrap()]);
    assert!(evaluate(&stations(), &config).is_err());
}
