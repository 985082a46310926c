//! Calendar arithmetic on ts_type periods.
//!
//! Periods are labelled by their start. Multiplied resolutions are anchored
//! at 1970-01-01 00:00 for sub-daily and daily bases, at Monday 1970-01-05
//! for weekly, and at year zero for monthly and yearly.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::TemporalResolutionError;
use crate::tstype::{BaseFreq, TsType};

fn overflow(reason: impl Into<String>) -> TemporalResolutionError {
    TemporalResolutionError::Overflow {
        reason: reason.into(),
    }
}

fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn first_of_month(month_index: i64) -> Result<NaiveDateTime, TemporalResolutionError> {
    let year = i32::try_from(month_index.div_euclid(12))
        .map_err(|_| overflow(format!("month index {month_index}")))?;
    let month = (month_index.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(day_start)
        .ok_or_else(|| overflow(format!("{year}-{month:02}-01")))
}

impl TsType {
    /// Start of the period containing `t`.
    pub fn floor(&self, t: NaiveDateTime) -> Result<NaiveDateTime, TemporalResolutionError> {
        let m = i64::from(self.multiplier());
        let date = t.date();
        match self.base() {
            BaseFreq::Minutely | BaseFreq::Hourly => {
                let unit = if self.base() == BaseFreq::Minutely { 60 } else { 3600 };
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| overflow("epoch"))?;
                let secs = (t - day_start(epoch)).num_seconds();
                Ok(day_start(epoch) + TimeDelta::seconds(secs - secs.rem_euclid(unit * m)))
            }
            BaseFreq::Daily => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| overflow("epoch"))?;
                let days = (date - epoch).num_days();
                Ok(day_start(date) - TimeDelta::days(days.rem_euclid(m)))
            }
            BaseFreq::Weekly => {
                let monday =
                    date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()));
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 5).ok_or_else(|| overflow("epoch"))?;
                let weeks = (monday - epoch).num_days() / 7;
                Ok(day_start(monday) - TimeDelta::weeks(weeks.rem_euclid(m)))
            }
            BaseFreq::Monthly => {
                let idx = i64::from(date.year()) * 12 + i64::from(date.month0());
                first_of_month(idx - idx.rem_euclid(m))
            }
            BaseFreq::Yearly => {
                let year = i64::from(date.year());
                first_of_month((year - year.rem_euclid(m)) * 12)
            }
            BaseFreq::Native => Err(TemporalResolutionError::Native { operation: "floor" }),
        }
    }

    /// Shifts `t` by `n` periods (negative `n` moves backwards).
    pub fn add_periods(
        &self,
        t: NaiveDateTime,
        n: i64,
    ) -> Result<NaiveDateTime, TemporalResolutionError> {
        let steps = n
            .checked_mul(i64::from(self.multiplier()))
            .ok_or_else(|| overflow(format!("{n} x {self}")))?;
        let delta = match self.base() {
            BaseFreq::Minutely => TimeDelta::try_minutes(steps),
            BaseFreq::Hourly => TimeDelta::try_hours(steps),
            BaseFreq::Daily => TimeDelta::try_days(steps),
            BaseFreq::Weekly => TimeDelta::try_weeks(steps),
            BaseFreq::Monthly | BaseFreq::Yearly => {
                let months = if self.base() == BaseFreq::Yearly {
                    steps.checked_mul(12)
                } else {
                    Some(steps)
                }
                .ok_or_else(|| overflow(format!("{n} x {self}")))?;
                let abs = u32::try_from(months.unsigned_abs())
                    .map_err(|_| overflow(format!("{months} months")))?;
                let shifted = if months >= 0 {
                    t.checked_add_months(Months::new(abs))
                } else {
                    t.checked_sub_months(Months::new(abs))
                };
                return shifted.ok_or_else(|| overflow(format!("{t} + {months} months")));
            }
            BaseFreq::Native => {
                return Err(TemporalResolutionError::Native {
                    operation: "add_periods",
                });
            }
        };
        delta
            .and_then(|d| t.checked_add_signed(d))
            .ok_or_else(|| overflow(format!("{t} + {n} x {self}")))
    }

    /// Uniform index of period starts covering `[start, stop]`.
    ///
    /// The first label is `floor(start)`; the last is the start of the period
    /// containing `stop`. Empty if `stop < start`.
    pub fn time_index(
        &self,
        start: NaiveDateTime,
        stop: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, TemporalResolutionError> {
        let mut index = Vec::new();
        if stop < start {
            return Ok(index);
        }
        let mut t = self.floor(start)?;
        while t <= stop {
            index.push(t);
            t = self.add_periods(t, 1)?;
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn ts(s: &str) -> TsType {
        s.parse().unwrap()
    }

    #[test]
    fn floor_hourly_multiple() {
        assert_eq!(ts("3hourly").floor(dt(2020, 5, 4, 7)).unwrap(), dt(2020, 5, 4, 6));
    }

    #[test]
    fn floor_weekly_is_monday() {
        // 2020-05-07 is a Thursday
        assert_eq!(ts("weekly").floor(dt(2020, 5, 7, 13)).unwrap(), dt(2020, 5, 4, 0));
    }

    #[test]
    fn floor_native_fails() {
        assert!(ts("native").floor(dt(2020, 1, 1, 0)).is_err());
    }

    #[test]
    fn add_months_backwards_over_year() {
        let t = ts("monthly").add_periods(dt(2020, 1, 1, 0), -2).unwrap();
        assert_eq!(t, dt(2019, 11, 1, 0));
    }
}
