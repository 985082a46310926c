//! Error types for the aerocol-stats crate.

/// Error type for all fallible operations in the aerocol-stats crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// Returned when paired inputs differ in length.
    #[error("{field}: expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Name of the mismatched input.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when weights cannot be normalised.
    #[error("invalid weights: {reason}")]
    InvalidWeights {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a statistic name is not recognised.
    #[error("unknown statistic '{name}'")]
    UnknownStatistic {
        /// The unrecognised name.
        name: String,
    },

    /// Returned when an aggregation method other than mean or median is requested.
    #[error("invalid aggregation method '{name}', choose from mean or median")]
    InvalidAggregation {
        /// The rejected method name.
        name: String,
    },

    /// Returned when configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}
