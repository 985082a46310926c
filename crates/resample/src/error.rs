//! Error types for the aerocol-resample crate.

/// Error type for all fallible operations in the aerocol-resample crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResampleError {
    /// Returned when time and value arrays differ in length.
    #[error("{field}: expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Name of the mismatched field.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when timestamps are not strictly increasing.
    #[error("timestamps not strictly increasing at index {index}")]
    Unsorted {
        /// First offending index.
        index: usize,
    },

    /// Returned when an aggregation name is not recognised.
    #[error("unknown aggregation '{name}'")]
    UnknownAggregation {
        /// The unrecognised name.
        name: String,
    },

    /// Returned when configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Temporal resolution error.
    #[error(transparent)]
    TemporalResolution(#[from] aerocol_tstype::TemporalResolutionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_length_mismatch() {
        let e = ResampleError::LengthMismatch {
            field: "values",
            expected: 10,
            got: 9,
        };
        assert_eq!(e.to_string(), "values: expected 10 elements, got 9");
    }

    #[test]
    fn display_unsorted() {
        let e = ResampleError::Unsorted { index: 4 };
        assert_eq!(e.to_string(), "timestamps not strictly increasing at index 4");
    }

    #[test]
    fn display_unknown_aggregation() {
        let e = ResampleError::UnknownAggregation {
            name: "mode".to_string(),
        };
        assert_eq!(e.to_string(), "unknown aggregation 'mode'");
    }

    #[test]
    fn display_invalid_config() {
        let e = ResampleError::InvalidConfig {
            reason: "bad".to_string(),
        };
        assert_eq!(e.to_string(), "invalid configuration: bad");
    }

    #[test]
    fn from_temporal_resolution_error() {
        let inner = aerocol_tstype::TemporalResolutionError::Native { operation: "floor" };
        let e: ResampleError = inner.clone().into();
        assert_eq!(e.to_string(), inner.to_string());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<ResampleError>();
    }
}
