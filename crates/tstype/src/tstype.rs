//! Temporal resolution value type.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemporalResolutionError;

/// Relative tolerance used when matching an elapsed duration to a ts_type.
pub const MATCH_TOLERANCE: f64 = 0.05;

/// Largest multiplier tried for yearly when inferring from elapsed time.
const YEARLY_SEARCH_MAX: u32 = 100;

/// Base frequency of a [`TsType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseFreq {
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Irregular sampling with no fixed period.
    Native,
}

impl BaseFreq {
    /// Regular bases ordered from finest to coarsest.
    pub const LADDER: [BaseFreq; 6] = [
        BaseFreq::Minutely,
        BaseFreq::Hourly,
        BaseFreq::Daily,
        BaseFreq::Weekly,
        BaseFreq::Monthly,
        BaseFreq::Yearly,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            BaseFreq::Minutely => "minutely",
            BaseFreq::Hourly => "hourly",
            BaseFreq::Daily => "daily",
            BaseFreq::Weekly => "weekly",
            BaseFreq::Monthly => "monthly",
            BaseFreq::Yearly => "yearly",
            BaseFreq::Native => "native",
        }
    }

    /// Nominal length of one period in seconds.
    ///
    /// Months count as 30 days and years as 365 days. `None` for native.
    pub fn seconds(self) -> Option<u64> {
        match self {
            BaseFreq::Minutely => Some(60),
            BaseFreq::Hourly => Some(3_600),
            BaseFreq::Daily => Some(86_400),
            BaseFreq::Weekly => Some(604_800),
            BaseFreq::Monthly => Some(2_592_000),
            BaseFreq::Yearly => Some(31_536_000),
            BaseFreq::Native => None,
        }
    }

    /// Maximum multiplier accepted for this base. `None` means uncapped.
    pub fn max_multiplier(self) -> Option<u32> {
        match self {
            BaseFreq::Minutely => Some(360),
            BaseFreq::Hourly => Some(168),
            BaseFreq::Daily => Some(180),
            BaseFreq::Weekly => Some(104),
            BaseFreq::Monthly => Some(120),
            BaseFreq::Yearly => None,
            BaseFreq::Native => Some(1),
        }
    }

    /// Position on [`BaseFreq::LADDER`], `None` for native.
    pub fn ladder_index(self) -> Option<usize> {
        Self::LADDER.iter().position(|b| *b == self)
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        let base = match suffix {
            "minutely" | "min" | "T" => BaseFreq::Minutely,
            "hourly" | "h" | "H" => BaseFreq::Hourly,
            "daily" | "D" | "d" => BaseFreq::Daily,
            "weekly" | "W" | "W-MON" => BaseFreq::Weekly,
            "monthly" | "MS" | "M" | "ME" => BaseFreq::Monthly,
            "yearly" | "YS" | "Y" | "YE" | "AS" | "A" => BaseFreq::Yearly,
            "native" => BaseFreq::Native,
            _ => return None,
        };
        Some(base)
    }
}

impl fmt::Display for BaseFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A temporal resolution: base frequency times an integer multiplier.
///
/// Parsed from strings like `"daily"`, `"3hourly"` or pandas-style aliases
/// (`"3h"`, `"MS"`). The multiplier is validated against a per-base cap, so
/// `"5000daily"` is rejected.
///
/// Ordering follows resolution: a finer resolution compares as *greater*
/// (`hourly > daily`). Native sampling is treated as the finest resolution.
///
/// # Example
///
/// ```
/// use aerocol_tstype::TsType;
///
/// let hourly: TsType = "hourly".parse().unwrap();
/// let daily: TsType = "daily".parse().unwrap();
/// assert!(hourly > daily);
/// assert_eq!(hourly.next_lower().unwrap(), daily);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TsType {
    base: BaseFreq,
    multiplier: u32,
}

impl TsType {
    /// Creates a validated ts_type.
    pub fn new(base: BaseFreq, multiplier: u32) -> Result<Self, TemporalResolutionError> {
        if multiplier == 0 {
            return Err(TemporalResolutionError::Invalid {
                value: format!("0{base}"),
                reason: "multiplier must be >= 1".to_string(),
            });
        }
        if let Some(max) = base.max_multiplier()
            && multiplier > max
        {
            if base == BaseFreq::Native {
                return Err(TemporalResolutionError::Invalid {
                    value: format!("{multiplier}{base}"),
                    reason: "native does not take a multiplier".to_string(),
                });
            }
            return Err(TemporalResolutionError::MultiplierTooLarge {
                base: base.name(),
                multiplier,
                max,
            });
        }
        Ok(Self { base, multiplier })
    }

    /// Shorthand for a ts_type with multiplier one.
    pub fn base_only(base: BaseFreq) -> Self {
        Self {
            base,
            multiplier: 1,
        }
    }

    pub fn native() -> Self {
        Self::base_only(BaseFreq::Native)
    }

    pub fn base(&self) -> BaseFreq {
        self.base
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn is_native(&self) -> bool {
        self.base == BaseFreq::Native
    }

    /// Re-assigns this value from a string, re-validating it.
    ///
    /// On error `self` is left unchanged.
    pub fn set_val(&mut self, value: &str) -> Result<(), TemporalResolutionError> {
        *self = value.parse()?;
        Ok(())
    }

    /// Nominal seconds of one period, multiplier included. `None` for native.
    pub fn num_secs(&self) -> Option<u64> {
        self.base
            .seconds()
            .map(|s| s * u64::from(self.multiplier))
    }

    /// Pandas offset alias for this resolution, e.g. `"3h"` or `"MS"`.
    pub fn to_pandas_freq(&self) -> Result<String, TemporalResolutionError> {
        let alias = match self.base {
            BaseFreq::Minutely => "min",
            BaseFreq::Hourly => "h",
            BaseFreq::Daily => "D",
            BaseFreq::Weekly => "W-MON",
            BaseFreq::Monthly => "MS",
            BaseFreq::Yearly => "YS",
            BaseFreq::Native => {
                return Err(TemporalResolutionError::Native {
                    operation: "to_pandas_freq",
                });
            }
        };
        if self.multiplier == 1 {
            Ok(alias.to_string())
        } else {
            Ok(format!("{}{alias}", self.multiplier))
        }
    }

    /// CF time unit used to encode a time axis at this resolution.
    pub fn to_cf_unit(&self) -> Result<&'static str, TemporalResolutionError> {
        match self.base {
            BaseFreq::Minutely => Ok("minutes"),
            BaseFreq::Hourly => Ok("hours"),
            BaseFreq::Daily | BaseFreq::Weekly | BaseFreq::Monthly | BaseFreq::Yearly => {
                Ok("days")
            }
            BaseFreq::Native => Err(TemporalResolutionError::Native {
                operation: "to_cf_unit",
            }),
        }
    }

    /// Next finer resolution on the ladder.
    ///
    /// A multiplied resolution first drops its multiplier (`3hourly` ->
    /// `hourly`).
    pub fn next_higher(&self) -> Result<TsType, TemporalResolutionError> {
        let idx = self.ladder_index("next_higher")?;
        if self.multiplier > 1 {
            return Ok(Self::base_only(self.base));
        }
        if idx == 0 {
            return Err(TemporalResolutionError::LadderEnd {
                ts_type: self.to_string(),
                direction: "higher",
            });
        }
        Ok(Self::base_only(BaseFreq::LADDER[idx - 1]))
    }

    /// Next coarser resolution on the ladder.
    ///
    /// A multiplied resolution moves to the smallest multiple of the next base
    /// that spans it (`13monthly` -> `2yearly`, `3hourly` -> `daily`).
    pub fn next_lower(&self) -> Result<TsType, TemporalResolutionError> {
        let idx = self.ladder_index("next_lower")?;
        if idx + 1 >= BaseFreq::LADDER.len() {
            return Err(TemporalResolutionError::LadderEnd {
                ts_type: self.to_string(),
                direction: "lower",
            });
        }
        let next = BaseFreq::LADDER[idx + 1];
        if self.multiplier == 1 {
            return Ok(Self::base_only(next));
        }
        let secs = self.num_secs().unwrap_or_default();
        let next_secs = next.seconds().unwrap_or(1);
        let k = secs.div_ceil(next_secs).max(1);
        let k = u32::try_from(k).map_err(|_| TemporalResolutionError::LadderEnd {
            ts_type: self.to_string(),
            direction: "lower",
        })?;
        Self::new(next, k)
    }

    /// Whether an elapsed duration matches one period within 5 %.
    pub fn check_match_total_seconds(&self, secs: f64) -> bool {
        match self.num_secs() {
            Some(n) => {
                let n = n as f64;
                ((secs - n) / n).abs() <= MATCH_TOLERANCE
            }
            None => false,
        }
    }

    /// Infers a ts_type from the elapsed seconds between two samples.
    ///
    /// Bases are searched from coarsest to finest and, within a base,
    /// multipliers in increasing order; the first match wins.
    pub fn infer_from_elapsed(secs: f64) -> Result<TsType, TemporalResolutionError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(TemporalResolutionError::Invalid {
                value: secs.to_string(),
                reason: "elapsed seconds must be finite and positive".to_string(),
            });
        }
        for base in BaseFreq::LADDER.iter().rev() {
            let max = base.max_multiplier().unwrap_or(YEARLY_SEARCH_MAX);
            for mult in 1..=max {
                let candidate = Self {
                    base: *base,
                    multiplier: mult,
                };
                if candidate.check_match_total_seconds(secs) {
                    return Ok(candidate);
                }
            }
        }
        Err(TemporalResolutionError::Invalid {
            value: secs.to_string(),
            reason: "no ts_type matches elapsed time".to_string(),
        })
    }

    fn ladder_index(&self, operation: &'static str) -> Result<usize, TemporalResolutionError> {
        self.base
            .ladder_index()
            .ok_or(TemporalResolutionError::Native { operation })
    }
}

impl PartialOrd for TsType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TsType {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.num_secs(), other.num_secs()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            // Fewer seconds is finer, hence greater. Equal spans order the
            // coarser base first (weekly < 7daily).
            (Some(a), Some(b)) => b.cmp(&a).then_with(|| {
                let ra = self.base.ladder_index().unwrap_or(0);
                let rb = other.base.ladder_index().unwrap_or(0);
                rb.cmp(&ra)
            }),
        }
    }
}

impl FromStr for TsType {
    type Err = TemporalResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TemporalResolutionError::Invalid {
                value: s.to_string(),
                reason: "missing base frequency".to_string(),
            })?;
        let (digits, suffix) = s.split_at(split);
        let multiplier = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|e| TemporalResolutionError::Invalid {
                    value: s.to_string(),
                    reason: format!("bad multiplier: {e}"),
                })?
        };
        let base = BaseFreq::from_suffix(suffix)
            .or_else(|| BaseFreq::from_suffix(&suffix.to_ascii_lowercase()))
            .ok_or_else(|| TemporalResolutionError::Invalid {
                value: s.to_string(),
                reason: format!("unknown base frequency '{suffix}'"),
            })?;
        Self::new(base, multiplier)
    }
}

impl TryFrom<String> for TsType {
    type Error = TemporalResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TsType> for String {
    fn from(value: TsType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiplier == 1 {
            write!(f, "{}", self.base)
        } else {
            write!(f, "{}{}", self.multiplier, self.base)
        }
    }
}
