//! Configuration for coverage-constrained resampling.

use aerocol_tstype::{MinNumObs, TsType};

use crate::error::ResampleError;
use crate::how::{Aggregation, ResampleHow};

/// Coverage rules and aggregators for [`resample_to`](crate::resample_to).
///
/// Per-variable settings are combined with global ones through
/// [`ResampleConfig::overridden_by`], per-variable rules taking precedence.
///
/// # Example
///
/// ```
/// use aerocol_resample::{Aggregation, ResampleConfig};
/// use aerocol_tstype::MinNumObs;
///
/// let config = ResampleConfig::new()
///     .with_min_num_obs(MinNumObs::default_obs())
///     .with_default_how(Aggregation::Mean);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResampleConfig {
    min_num_obs: MinNumObs,
    how: ResampleHow,
    default_how: Aggregation,
}

impl ResampleConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: no coverage rules, no aggregation rules, mean aggregation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coverage rules.
    pub fn with_min_num_obs(mut self, min_num_obs: MinNumObs) -> Self {
        self.min_num_obs = min_num_obs;
        self
    }

    /// Sets the per-level aggregation rules.
    pub fn with_how(mut self, how: ResampleHow) -> Self {
        self.how = how;
        self
    }

    /// Sets the aggregator used where no rule matches.
    pub fn with_default_how(mut self, how: Aggregation) -> Self {
        self.default_how = how;
        self
    }

    // --- Accessors ---

    pub fn min_num_obs(&self) -> &MinNumObs {
        &self.min_num_obs
    }

    pub fn how(&self) -> &ResampleHow {
        &self.how
    }

    pub fn default_how(&self) -> Aggregation {
        self.default_how
    }

    /// Layers more specific settings over this one.
    pub fn overridden_by(&self, min_num_obs: Option<&MinNumObs>, how: Option<&ResampleHow>) -> Self {
        Self {
            min_num_obs: match min_num_obs {
                Some(m) => self.min_num_obs.overridden_by(m),
                None => self.min_num_obs.clone(),
            },
            how: match how {
                Some(h) => self.how.overridden_by(h),
                None => self.how.clone(),
            },
            default_how: self.default_how,
        }
    }

    /// Validates this configuration.
    ///
    /// Every rule must go from a finer to a strictly coarser resolution.
    pub fn validate(&self) -> Result<(), ResampleError> {
        let check = |from: &TsType, to: &TsType| {
            if to >= from {
                Err(ResampleError::InvalidConfig {
                    reason: format!("rule '{from}' -> '{to}' does not go to a coarser resolution"),
                })
            } else {
                Ok(())
            }
        };
        for r in self.min_num_obs.rules() {
            check(&r.from, &r.to)?;
        }
        for r in self.how.rules() {
            check(&r.from, &r.to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::how::HowRule;
    use aerocol_tstype::CoverageRule;

    fn ts(s: &str) -> TsType {
        s.parse().unwrap()
    }

    #[test]
    fn defaults() {
        let cfg = ResampleConfig::new();
        assert_eq!(cfg.min_num_obs(), &MinNumObs::none());
        assert!(cfg.how().rules().is_empty());
        assert_eq!(cfg.default_how(), Aggregation::Mean);
    }

    #[test]
    fn builder_chaining() {
        let how = ResampleHow::new(vec![HowRule::new(ts("hourly"), ts("daily"), Aggregation::Max)]);
        let cfg = ResampleConfig::new()
            .with_min_num_obs(MinNumObs::Fixed(3))
            .with_how(how.clone())
            .with_default_how(Aggregation::Median);
        assert_eq!(cfg.min_num_obs(), &MinNumObs::Fixed(3));
        assert_eq!(cfg.how(), &how);
        assert_eq!(cfg.default_how(), Aggregation::Median);
    }

    #[test]
    fn validate_bad_rule_direction() {
        let cfg = ResampleConfig::new().with_min_num_obs(MinNumObs::Hierarchical(vec![
            CoverageRule::new(ts("daily"), ts("hourly"), 3),
        ]));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overrides_apply() {
        let global = ResampleConfig::new().with_min_num_obs(MinNumObs::default_obs());
        let per_var = MinNumObs::Hierarchical(vec![CoverageRule::new(ts("hourly"), ts("daily"), 18)]);
        let cfg = global.overridden_by(Some(&per_var), None);
        assert_eq!(cfg.min_num_obs().lookup(&ts("hourly"), &ts("daily")), Some(18));
    }
}
