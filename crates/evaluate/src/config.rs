//! Evaluation configuration.

use aerocol_colocated::Region;
use aerocol_stats::StatisticsConfig;

use crate::error::EvaluateError;

/// Configuration for the evaluation report.
///
/// WORLD is always evaluated; `regions` are evaluated in addition.
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    statistics: StatisticsConfig,
    regions: Vec<Region>,
    use_area_weights: bool,
    station_statistics: bool,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            statistics: StatisticsConfig::new(),
            regions: Region::default_regions(),
            use_area_weights: false,
            station_statistics: true,
        }
    }
}

impl EvaluateConfig {
    /// Set the statistics engine configuration.
    pub fn with_statistics(mut self, statistics: StatisticsConfig) -> Self {
        self.statistics = statistics;
        self
    }

    /// Set the regions evaluated besides WORLD.
    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    /// Weight grid cells by the cosine of their latitude.
    pub fn with_use_area_weights(mut self, use_area_weights: bool) -> Self {
        self.use_area_weights = use_area_weights;
        self
    }

    /// Whether to compute statistics for every station.
    pub fn with_station_statistics(mut self, enabled: bool) -> Self {
        self.station_statistics = enabled;
        self
    }

    /// Returns the statistics engine configuration.
    pub fn statistics(&self) -> &StatisticsConfig {
        &self.statistics
    }

    /// Returns the regions evaluated besides WORLD.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn use_area_weights(&self) -> bool {
        self.use_area_weights
    }

    pub fn station_statistics(&self) -> bool {
        self.station_statistics
    }

    /// Validates this configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), EvaluateError> {
        let mut problems = Vec::new();
        if let Err(e) = self.statistics.validate() {
            problems.push(e.to_string());
        }
        for (i, region) in self.regions.iter().enumerate() {
            if region.name.is_empty() {
                problems.push(format!("region {i} has no name"));
            }
            if region.name == "WORLD" {
                problems.push("WORLD is always evaluated and must not be listed".to_string());
            }
            if self.regions[..i].iter().any(|r| r.name == region.name) {
                problems.push(format!("duplicate region '{}'", region.name));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(EvaluateError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }
}
