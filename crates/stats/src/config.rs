//! Configuration for statistics calculation.

use crate::error::StatsError;
use crate::statistic::Statistic;

/// Configuration for [`calculate_statistics`](crate::calculate_statistics).
///
/// # Example
///
/// ```
/// use aerocol_stats::StatisticsConfig;
///
/// let config = StatisticsConfig::new()
///     .with_min_num_valid(3)
///     .with_drop_stats(["mb", "mab"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsConfig {
    statistics: Vec<Statistic>,
    min_num_valid: usize,
    drop_stats: Vec<String>,
    lowlim: Option<f64>,
    highlim: Option<f64>,
}

impl StatisticsConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: all statistics in [`Statistic::DEFAULT`], `min_num_valid = 1`,
    /// nothing dropped, no value limits.
    pub fn new() -> Self {
        Self {
            statistics: Statistic::DEFAULT.to_vec(),
            min_num_valid: 1,
            drop_stats: Vec::new(),
            lowlim: None,
            highlim: None,
        }
    }

    /// Sets the statistics to compute, in output order.
    pub fn with_statistics(mut self, statistics: Vec<Statistic>) -> Self {
        self.statistics = statistics;
        self
    }

    /// Sets the minimum number of valid pairs below which every statistic is NaN.
    pub fn with_min_num_valid(mut self, n: usize) -> Self {
        self.min_num_valid = n;
        self
    }

    /// Sets statistic names removed from the result.
    pub fn with_drop_stats(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.drop_stats = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the lower value limit applied to both series.
    pub fn with_lowlim(mut self, lowlim: Option<f64>) -> Self {
        self.lowlim = lowlim;
        self
    }

    /// Sets the upper value limit applied to both series.
    pub fn with_highlim(mut self, highlim: Option<f64>) -> Self {
        self.highlim = highlim;
        self
    }

    // --- Accessors ---

    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    pub fn min_num_valid(&self) -> usize {
        self.min_num_valid
    }

    pub fn drop_stats(&self) -> &[String] {
        &self.drop_stats
    }

    pub fn lowlim(&self) -> Option<f64> {
        self.lowlim
    }

    pub fn highlim(&self) -> Option<f64> {
        self.highlim
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), StatsError> {
        for (name, lim) in [("lowlim", self.lowlim), ("highlim", self.highlim)] {
            if let Some(v) = lim
                && v.is_nan()
            {
                return Err(StatsError::InvalidConfig {
                    reason: format!("{name} must not be NaN"),
                });
            }
        }
        if let (Some(lo), Some(hi)) = (self.lowlim, self.highlim)
            && lo > hi
        {
            return Err(StatsError::InvalidConfig {
                reason: format!("lowlim ({lo}) must be <= highlim ({hi})"),
            });
        }
        Ok(())
    }
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = StatisticsConfig::new();
        assert_eq!(cfg.statistics().len(), 13);
        assert_eq!(cfg.min_num_valid(), 1);
        assert!(cfg.drop_stats().is_empty());
        assert_eq!(cfg.lowlim(), None);
        assert_eq!(cfg.highlim(), None);
    }

    #[test]
    fn builder_chaining() {
        let cfg = StatisticsConfig::new()
            .with_statistics(vec![Statistic::R, Statistic::Nmb])
            .with_min_num_valid(5)
            .with_drop_stats(["R"])
            .with_lowlim(Some(0.0))
            .with_highlim(Some(100.0));
        assert_eq!(cfg.statistics(), &[Statistic::R, Statistic::Nmb]);
        assert_eq!(cfg.min_num_valid(), 5);
        assert_eq!(cfg.drop_stats(), &["R".to_string()]);
        assert_eq!(cfg.lowlim(), Some(0.0));
        assert_eq!(cfg.highlim(), Some(100.0));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_bad_limits() {
        let cfg = StatisticsConfig::new()
            .with_lowlim(Some(10.0))
            .with_highlim(Some(1.0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_nan_limit() {
        let cfg = StatisticsConfig::new().with_lowlim(Some(f64::NAN));
        assert!(cfg.validate().is_err());
    }
}
