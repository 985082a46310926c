//! Filename template round trips.

use aerocol_colocated::{ColocatedData, ColocationMeta, FilenameMeta, VerticalLayer};
use chrono::NaiveDate;
use ndarray::Array3;

fn meta() -> FilenameMeta {
    FilenameMeta {
        model_var: "od550aer".to_string(),
        obs_var: "od550aer".to_string(),
        model_name: "TM5-met2010_CTRL-TEST".to_string(),
        obs_name: "AeronetSunV3L2Subset.daily".to_string(),
        start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
        stop: NaiveDate::from_ymd_opt(2010, 12, 31).unwrap(),
        ts_type: "monthly".parse().unwrap(),
        filter_name: "WORLD-wMOUNTAINS".to_string(),
        vertical_layer: None,
    }
}

#[test]
fn roundtrip() {
    let m = meta();
    let name = m.to_filename();
    assert_eq!(
        name,
        "od550aer_od550aer_MOD-TM5-met2010_CTRL-TEST_REF-AeronetSunV3L2Subset.daily_20100101_20101231_monthly_WORLD-wMOUNTAINS.nc"
    );
    assert_eq!(FilenameMeta::from_filename(&name).unwrap(), m);
}

#[test]
fn roundtrip_with_layer() {
    let m = FilenameMeta {
        vertical_layer: Some((0.0, 1.5)),
        ..meta()
    };
    let name = m.to_filename();
    assert!(name.ends_with("_0-1.5km.nc"));
    assert_eq!(FilenameMeta::from_filename(&name).unwrap(), m);
}

#[test]
fn container_savename() {
    let time = vec![
        NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        NaiveDate::from_ymd_opt(2010, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
    ];
    let mut meta = ColocationMeta::new("EBAS", "EMEP", "concpm10", "concpm10")
        .with_ts_type("monthly".parse().unwrap());
    meta.vertical_layer = Some(VerticalLayer::new(0.0, 2000.0));
    let cd = ColocatedData::point(
        Array3::zeros((2, 2, 1)),
        time,
        vec!["s".to_string()],
        vec![0.0],
        vec![0.0],
        meta,
    )
    .unwrap();
    assert_eq!(
        cd.savename().unwrap(),
        "concpm10_concpm10_MOD-EMEP_REF-EBAS_20100101_20100201_monthly_WORLD_0-2km.nc"
    );
}
