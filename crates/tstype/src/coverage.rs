//! Minimum-observation coverage rules.

use serde::{Deserialize, Serialize};

use crate::error::TemporalResolutionError;
use crate::tstype::{BaseFreq, TsType};

/// Required number of valid `from` samples per `to` period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRule {
    pub from: TsType,
    pub to: TsType,
    pub min_count: u32,
}

impl CoverageRule {
    pub fn new(from: TsType, to: TsType, min_count: u32) -> Self {
        Self {
            from,
            to,
            min_count,
        }
    }
}

/// Coverage requirement for a resampling operation.
///
/// `Fixed` applies one count to the direct conversion. `Hierarchical` is an
/// ordered rule list; the first rule matching a `(from, to)` pair wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinNumObs {
    Fixed(u32),
    Hierarchical(Vec<CoverageRule>),
}

impl MinNumObs {
    /// Coverage rules applied to observations when nothing else is configured.
    ///
    /// yearly <- monthly: 3, monthly <- daily: 7, daily <- hourly: 6,
    /// hourly <- minutely: 15.
    pub fn default_obs() -> Self {
        let b = TsType::base_only;
        MinNumObs::Hierarchical(vec![
            CoverageRule::new(b(BaseFreq::Monthly), b(BaseFreq::Yearly), 3),
            CoverageRule::new(b(BaseFreq::Daily), b(BaseFreq::Monthly), 7),
            CoverageRule::new(b(BaseFreq::Hourly), b(BaseFreq::Daily), 6),
            CoverageRule::new(b(BaseFreq::Minutely), b(BaseFreq::Hourly), 15),
        ])
    }

    /// Empty rule list: no coverage constraints.
    pub fn none() -> Self {
        MinNumObs::Hierarchical(Vec::new())
    }

    /// Rule list, empty for `Fixed`.
    pub fn rules(&self) -> &[CoverageRule] {
        match self {
            MinNumObs::Fixed(_) => &[],
            MinNumObs::Hierarchical(rules) => rules,
        }
    }

    /// Count configured for exactly `from -> to`, if any.
    pub fn lookup(&self, from: &TsType, to: &TsType) -> Option<u32> {
        match self {
            MinNumObs::Fixed(n) => Some(*n),
            MinNumObs::Hierarchical(rules) => rules
                .iter()
                .find(|r| r.from == *from && r.to == *to)
                .map(|r| r.min_count),
        }
    }

    /// Combines `self` (global) with more specific `overrides`.
    ///
    /// Override rules are consulted first, so they win for any pair both
    /// define. A `Fixed` override replaces everything.
    pub fn overridden_by(&self, overrides: &MinNumObs) -> MinNumObs {
        match (self, overrides) {
            (_, MinNumObs::Fixed(n)) => MinNumObs::Fixed(*n),
            (MinNumObs::Fixed(n), MinNumObs::Hierarchical(rules)) if rules.is_empty() => {
                MinNumObs::Fixed(*n)
            }
            (MinNumObs::Fixed(_), MinNumObs::Hierarchical(rules)) => {
                MinNumObs::Hierarchical(rules.clone())
            }
            (MinNumObs::Hierarchical(global), MinNumObs::Hierarchical(rules)) => {
                let mut merged = rules.clone();
                merged.extend(global.iter().copied());
                MinNumObs::Hierarchical(merged)
            }
        }
    }
}

impl Default for MinNumObs {
    fn default() -> Self {
        Self::none()
    }
}

impl TsType {
    /// Number of valid `self` samples required per period of `to`.
    ///
    /// Returns 1 when `to` equals `self`. Fails if `to` is finer than `self`
    /// or no rule covers the conversion.
    pub fn get_min_num_obs(
        &self,
        to: &TsType,
        rules: &MinNumObs,
    ) -> Result<u32, TemporalResolutionError> {
        if to > self {
            return Err(TemporalResolutionError::FinerTarget {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        if to == self {
            return Ok(1);
        }
        rules
            .lookup(self, to)
            .ok_or_else(|| TemporalResolutionError::MissingRule {
                from: self.to_string(),
                to: to.to_string(),
            })
    }
}
