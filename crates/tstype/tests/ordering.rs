use aerocol_tstype::{BaseFreq, TemporalResolutionError, TsType};

const ALL: &[&str] = &[
    "minutely", "15minutely", "hourly", "3hourly", "6hourly", "24hourly", "daily", "7daily",
    "weekly", "2weekly", "monthly", "3monthly", "13monthly", "yearly", "2yearly", "native",
];

fn ts(s: &str) -> TsType {
    s.parse().unwrap()
}

#[test]
fn finer_compares_greater() {
    assert!(ts("hourly") > ts("daily"));
    assert!(ts("daily") > ts("monthly"));
    assert!(ts("minutely") > ts("3hourly"));
    assert!(ts("native") > ts("minutely"));
}

#[test]
fn ordering_is_transitive() {
    for a in ALL {
        for b in ALL {
            for c in ALL {
                let (a, b, c) = (ts(a), ts(b), ts(c));
                if a < b && b < c {
                    assert!(a < c, "{a} < {b} < {c} but not {a} < {c}");
                }
            }
        }
    }
}

#[test]
fn equal_only_when_base_and_multiplier_match() {
    for a in ALL {
        for b in ALL {
            let (ta, tb) = (ts(a), ts(b));
            assert_eq!(ta == tb, a == b, "{a} vs {b}");
            assert_eq!(ta.cmp(&tb) == std::cmp::Ordering::Equal, a == b);
        }
    }
}

#[test]
fn same_span_orders_coarser_base_first() {
    assert!(ts("weekly") < ts("7daily"));
    assert!(ts("daily") < ts("24hourly"));
}

#[test]
fn next_higher_walks_down_the_ladder() {
    assert_eq!(ts("daily").next_higher().unwrap(), ts("hourly"));
    assert_eq!(ts("3hourly").next_higher().unwrap(), ts("hourly"));
    assert_eq!(ts("yearly").next_higher().unwrap(), ts("monthly"));
    let err = ts("minutely").next_higher().unwrap_err();
    assert!(matches!(err, TemporalResolutionError::LadderEnd { direction: "higher", .. }));
}

#[test]
fn next_lower_may_grow_multiplier() {
    assert_eq!(ts("hourly").next_lower().unwrap(), ts("daily"));
    assert_eq!(ts("13monthly").next_lower().unwrap(), ts("2yearly"));
    assert_eq!(ts("3hourly").next_lower().unwrap(), ts("daily"));
    assert_eq!(ts("10daily").next_lower().unwrap(), ts("2weekly"));
    let err = ts("yearly").next_lower().unwrap_err();
    assert!(matches!(err, TemporalResolutionError::LadderEnd { direction: "lower", .. }));
}

#[test]
fn native_has_no_ladder_position() {
    assert!(matches!(
        ts("native").next_lower(),
        Err(TemporalResolutionError::Native { .. })
    ));
}

#[test]
fn match_total_seconds_within_tolerance() {
    let monthly = ts("monthly");
    assert!(monthly.check_match_total_seconds(31.0 * 86_400.0));
    assert!(!monthly.check_match_total_seconds(20.0 * 86_400.0));
    assert!(ts("daily").check_match_total_seconds(86_400.0 * 1.04));
    assert!(!ts("daily").check_match_total_seconds(86_400.0 * 1.06));
}

#[test]
fn infer_prefers_coarsest_base() {
    assert_eq!(TsType::infer_from_elapsed(86_400.0).unwrap(), ts("daily"));
    assert_eq!(TsType::infer_from_elapsed(604_800.0).unwrap(), ts("weekly"));
    assert_eq!(TsType::infer_from_elapsed(10_800.0).unwrap(), ts("3hourly"));
    assert_eq!(
        TsType::infer_from_elapsed(31.0 * 86_400.0).unwrap(),
        TsType::base_only(BaseFreq::Monthly)
    );
    assert!(TsType::infer_from_elapsed(-1.0).is_err());
}
