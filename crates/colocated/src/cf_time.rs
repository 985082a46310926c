//! CF-convention time coordinate encoding.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::ColocatedDataError;

/// Units written for every time coordinate produced by this workspace.
pub const CF_TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

/// Parsed `"<unit> since <reference>"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    /// Seconds in one unit step.
    pub step_secs: i64,
    pub reference: NaiveDateTime,
}

/// Parses CF time units such as `"hours since 2010-01-01 00:00:00"`.
///
/// Accepted units are seconds, minutes, hours and days (singular or plural).
/// The reference may be a date, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_cf_time_units(units: &str) -> Result<CfTimeUnits, ColocatedDataError> {
    let invalid = |reason: String| ColocatedDataError::InvalidTime { reason };
    let mut parts = units.trim().splitn(3, ' ');
    let unit = parts.next().unwrap_or_default();
    if parts.next() != Some("since") {
        return Err(invalid(format!("unexpected time units format: '{units}'")));
    }
    let reference = parts.next().unwrap_or_default().trim();

    let step_secs = match unit.to_ascii_lowercase().trim_end_matches('s') {
        "second" | "sec" => 1,
        "minute" | "min" => 60,
        "hour" | "h" => 3_600,
        "day" | "d" => 86_400,
        other => return Err(invalid(format!("unsupported time unit '{other}'"))),
    };

    let reference = parse_reference(reference)
        .ok_or_else(|| invalid(format!("failed to parse reference time '{reference}'")))?;
    Ok(CfTimeUnits {
        step_secs,
        reference,
    })
}

fn parse_reference(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_end_matches('Z').trim_end_matches(" UTC");
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Converts offsets in `units` to timestamps, rounded to the nearest second.
pub fn decode_cf_times(
    offsets: &[f64],
    units: &CfTimeUnits,
) -> Result<Vec<NaiveDateTime>, ColocatedDataError> {
    offsets
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(ColocatedDataError::InvalidTime {
                    reason: format!("non-finite time value {v}"),
                });
            }
            let secs = (v * units.step_secs as f64).round() as i64;
            units
                .reference
                .checked_add_signed(TimeDelta::seconds(secs))
                .ok_or_else(|| ColocatedDataError::InvalidTime {
                    reason: format!("time offset {v} overflows"),
                })
        })
        .collect()
}

/// Encodes timestamps as seconds since the Unix epoch ([`CF_TIME_UNITS`]).
pub fn encode_cf_times(times: &[NaiveDateTime]) -> Vec<f64> {
    times
        .iter()
        .map(|t| t.and_utc().timestamp() as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hours_since() {
        let u = parse_cf_time_units("hours since 2010-01-01 00:00:00").unwrap();
        assert_eq!(u.step_secs, 3600);
        assert_eq!(
            u.reference,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_days_since_date_only() {
        let u = parse_cf_time_units("days since 2000-01-01").unwrap();
        assert_eq!(u.step_secs, 86_400);
    }

    #[test]
    fn parse_rejects_months() {
        assert!(parse_cf_time_units("months since 2000-01-01").is_err());
        assert!(parse_cf_time_units("hours after 2000-01-01").is_err());
    }

    #[test]
    fn encode_decode() {
        let u = parse_cf_time_units(CF_TIME_UNITS).unwrap();
        let t = NaiveDate::from_ymd_opt(2019, 3, 4).unwrap().and_hms_opt(5, 0, 0).unwrap();
        let enc = encode_cf_times(&[t]);
        assert_eq!(decode_cf_times(&enc, &u).unwrap(), vec![t]);
    }

    #[test]
    fn decode_days_fraction() {
        let u = parse_cf_time_units("days since 2000-01-01").unwrap();
        let t = decode_cf_times(&[1.5], &u).unwrap();
        assert_eq!(
            t[0],
            NaiveDate::from_ymd_opt(2000, 1, 2).unwrap().and_hms_opt(12, 0, 0).unwrap()
        );
    }
}
