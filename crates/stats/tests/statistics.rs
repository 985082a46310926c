use aerocol_stats::{
    ROLLED_UP_KEYS, Statistic, StatisticsConfig, calculate_statistics, stats_dummy,
};
use approx::assert_relative_eq;

fn series() -> Vec<f64> {
    (0..50).map(|i| (i as f64 * 0.37).sin() * 10.0 + 20.0).collect()
}

#[test]
fn self_comparison_is_perfect() {
    let x = series();
    let s = calculate_statistics(&x, &x, None, &StatisticsConfig::new()).unwrap();
    assert_relative_eq!(s.get("R").unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("R_spearman").unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("R_kendall").unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("rms").unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("nmb").unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("mnmb").unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("fge").unwrap(), 0.0, epsilon = 1e-12);
    assert_eq!(s.weighted(), Some(false));
}

#[test]
fn num_valid_counts_pairs_without_nan() {
    let mut data = series();
    let mut ref_data = series();
    data[3] = f64::NAN;
    ref_data[7] = f64::NAN;
    ref_data[3] = f64::NAN;
    let s = calculate_statistics(&data, &ref_data, None, &StatisticsConfig::new()).unwrap();
    assert_eq!(s.totnum(), 50.0);
    assert_eq!(s.num_valid(), 48.0);
}

#[test]
fn num_valid_respects_limits() {
    let data = [1.0, 5.0, 9.0, 12.0];
    let ref_data = [2.0, -1.0, 8.0, 3.0];
    let cfg = StatisticsConfig::new()
        .with_lowlim(Some(0.0))
        .with_highlim(Some(10.0));
    let s = calculate_statistics(&data, &ref_data, None, &cfg).unwrap();
    assert_eq!(s.num_valid(), 2.0);
}

#[test]
fn below_min_num_valid_everything_nan_but_present() {
    let cfg = StatisticsConfig::new().with_min_num_valid(5);
    let s = calculate_statistics(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0], None, &cfg).unwrap();
    for st in Statistic::DEFAULT {
        assert!(s.get(st.name()).unwrap().is_nan(), "{st} should be NaN");
    }
    assert_eq!(s.num_valid(), 3.0);
}

#[test]
fn bias_values() {
    let data = [2.0, 4.0, 6.0];
    let ref_data = [1.0, 2.0, 3.0];
    let s = calculate_statistics(&data, &ref_data, None, &StatisticsConfig::new()).unwrap();
    assert_relative_eq!(s.get("mb").unwrap(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("mab").unwrap(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("nmb").unwrap(), 1.0, epsilon = 1e-12);
    // each (d - r) / (d + r) = 1/3
    assert_relative_eq!(s.get("mnmb").unwrap(), 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("fge").unwrap(), 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("refdata_mean").unwrap(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(s.get("data_mean").unwrap(), 4.0, epsilon = 1e-12);
}

#[test]
fn drop_stats_hides_keys_only() {
    let x = series();
    let cfg = StatisticsConfig::new().with_drop_stats(["mb", "mab"]);
    let s = calculate_statistics(&x, &x, None, &cfg).unwrap();
    assert!(s.get("mb").is_none());
    assert!(s.get("mab").is_none());
    assert!(s.get("nmb").is_some());
}

#[test]
fn dummy_has_real_keys_plus_rolled_up() {
    let cfg = StatisticsConfig::new().with_drop_stats(["R_kendall"]);
    let x = series();
    let real = calculate_statistics(&x, &x, None, &cfg).unwrap();
    let dummy = stats_dummy(&cfg).unwrap();

    let mut expected: Vec<&str> = real.keys();
    expected.extend(ROLLED_UP_KEYS);
    assert_eq!(dummy.keys(), expected);
    assert!(dummy.iter().all(|(_, v)| v.is_nan()));
    assert_eq!(dummy.weighted(), None);
}

#[test]
fn key_order_is_stable() {
    let x = series();
    let s = calculate_statistics(&x, &x, None, &StatisticsConfig::new()).unwrap();
    assert_eq!(&s.keys()[..4], &["totnum", "weighted", "num_valid", "refdata_mean"]);
}

#[test]
fn report_serialises_with_nulls() {
    let cfg = StatisticsConfig::new().with_statistics(vec![Statistic::R]);
    let s = calculate_statistics(&[1.0], &[1.0], None, &cfg).unwrap();
    let json = serde_json::to_value(&s).unwrap();
    assert!(json["R"].is_null());
    assert_eq!(json["totnum"], 1.0);
}
