//! Error types for the aerocol-tstype crate.

/// Error type for all fallible operations in the aerocol-tstype crate.
///
/// Covers malformed ts_type strings, multipliers outside the per-base cap,
/// navigation past the ends of the resolution ladder, and coverage lookups
/// that violate the resolution ordering.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemporalResolutionError {
    /// Returned when a string cannot be parsed into a ts_type.
    #[error("invalid ts_type '{value}': {reason}")]
    Invalid {
        /// The string that failed to parse.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Returned when the multiplier exceeds the cap for its base frequency.
    #[error("multiplier {multiplier} exceeds maximum {max} for base '{base}'")]
    MultiplierTooLarge {
        /// Base frequency name.
        base: &'static str,
        /// Requested multiplier.
        multiplier: u32,
        /// Maximum allowed multiplier for this base.
        max: u32,
    },

    /// Returned when navigating past either end of the resolution ladder.
    #[error("no {direction} resolution available than '{ts_type}'")]
    LadderEnd {
        /// The ts_type navigation started from.
        ts_type: String,
        /// Either "higher" or "lower".
        direction: &'static str,
    },

    /// Returned when a conversion target is finer than its source.
    #[error("cannot convert '{from}' to higher resolution '{to}'")]
    FinerTarget {
        /// Source resolution.
        from: String,
        /// Requested (finer) target resolution.
        to: String,
    },

    /// Returned when no coverage rule matches a conversion.
    #[error("no min_num_obs rule for conversion from '{from}' to '{to}'")]
    MissingRule {
        /// Source resolution.
        from: String,
        /// Target resolution.
        to: String,
    },

    /// Returned when an operation needs a regular period but got `native`.
    #[error("operation '{operation}' is undefined for native resolution")]
    Native {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// Returned when calendar arithmetic leaves the representable range.
    #[error("date arithmetic overflow: {reason}")]
    Overflow {
        /// Description of the overflow.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid() {
        let err = TemporalResolutionError::Invalid {
            value: "fortnightly".to_string(),
            reason: "unknown base".to_string(),
        };
        assert_eq!(err.to_string(), "invalid ts_type 'fortnightly': unknown base");
    }

    #[test]
    fn display_multiplier_too_large() {
        let err = TemporalResolutionError::MultiplierTooLarge {
            base: "daily",
            multiplier: 5000,
            max: 180,
        };
        assert_eq!(
            err.to_string(),
            "multiplier 5000 exceeds maximum 180 for base 'daily'"
        );
    }

    #[test]
    fn display_ladder_end() {
        let err = TemporalResolutionError::LadderEnd {
            ts_type: "minutely".to_string(),
            direction: "higher",
        };
        assert_eq!(
            err.to_string(),
            "no higher resolution available than 'minutely'"
        );
    }

    #[test]
    fn display_finer_target() {
        let err = TemporalResolutionError::FinerTarget {
            from: "daily".to_string(),
            to: "hourly".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot convert 'daily' to higher resolution 'hourly'"
        );
    }

    #[test]
    fn display_missing_rule() {
        let err = TemporalResolutionError::MissingRule {
            from: "hourly".to_string(),
            to: "monthly".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no min_num_obs rule for conversion from 'hourly' to 'monthly'"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<TemporalResolutionError>();
    }
}
