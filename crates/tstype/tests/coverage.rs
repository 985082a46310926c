use aerocol_tstype::{CoverageRule, MinNumObs, TemporalResolutionError, TsType};

fn ts(s: &str) -> TsType {
    s.parse().unwrap()
}

#[test]
fn min_num_obs_from_rules() {
    let rules = MinNumObs::Hierarchical(vec![CoverageRule::new(ts("daily"), ts("monthly"), 21)]);
    assert_eq!(ts("daily").get_min_num_obs(&ts("monthly"), &rules).unwrap(), 21);
}

#[test]
fn min_num_obs_same_resolution_is_one() {
    assert_eq!(
        ts("daily")
            .get_min_num_obs(&ts("daily"), &MinNumObs::none())
            .unwrap(),
        1
    );
}

#[test]
fn min_num_obs_fixed_applies_directly() {
    let n = ts("hourly")
        .get_min_num_obs(&ts("monthly"), &MinNumObs::Fixed(100))
        .unwrap();
    assert_eq!(n, 100);
}

#[test]
fn min_num_obs_rejects_finer_target() {
    let err = ts("daily")
        .get_min_num_obs(&ts("hourly"), &MinNumObs::default_obs())
        .unwrap_err();
    assert!(matches!(err, TemporalResolutionError::FinerTarget { .. }));
}

#[test]
fn min_num_obs_missing_rule() {
    let err = ts("hourly")
        .get_min_num_obs(&ts("monthly"), &MinNumObs::default_obs())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no min_num_obs rule for conversion from 'hourly' to 'monthly'"
    );
}

#[test]
fn default_obs_covers_ladder_steps() {
    let rules = MinNumObs::default_obs();
    let pairs = [
        ("monthly", "yearly", 3),
        ("daily", "monthly", 7),
        ("hourly", "daily", 6),
        ("minutely", "hourly", 15),
    ];
    for (from, to, n) in pairs {
        assert_eq!(ts(from).get_min_num_obs(&ts(to), &rules).unwrap(), n);
    }
}
