//! Error types for the aerocol-colocate crate.

/// Error type for all fallible operations in the aerocol-colocate crate.
///
/// Most variants describe a problem with one variable pair and are recorded
/// by the batch [`Colocator`](crate::Colocator) before it moves on.
/// [`ColocateError::Internal`] marks a broken invariant and always aborts.
#[derive(Debug, thiserror::Error)]
pub enum ColocateError {
    /// Returned when the two sources share no time range.
    #[error("time match error: {reason}")]
    TimeMatch {
        /// Description of the two ranges.
        reason: String,
    },

    /// Returned when two unit strings cannot be converted into each other.
    #[error("cannot convert unit '{from}' to '{to}'")]
    DataUnit {
        /// Source unit.
        from: String,
        /// Target unit.
        to: String,
    },

    /// Returned when a colocation cannot produce a valid result.
    #[error("colocation error: {reason}")]
    Colocation {
        /// Description of the failure.
        reason: String,
    },

    /// Returned when the colocation setup is invalid or contradictory.
    #[error("invalid colocation setup: {reason}")]
    Setup {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a source does not provide a requested variable.
    #[error("variable '{var_name}' not available in '{source_name}'")]
    VariableNotFound {
        /// Requested variable.
        var_name: String,
        /// Source that was asked.
        source_name: String,
    },

    /// Returned when reading from a data source fails.
    #[error("failed to read from '{source_name}': {reason}")]
    Read {
        /// Source that failed.
        source_name: String,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when an array is malformed on input.
    #[error("invalid data dimensions: {reason}")]
    DataDimension {
        /// Description of the violation.
        reason: String,
    },

    /// Internal consistency violation. Never caught by the batch runner.
    #[error("internal colocation invariant violated: {reason}")]
    Internal {
        /// Description of the violated invariant.
        reason: String,
    },

    /// Error from the colocated-data container.
    #[error(transparent)]
    ColocatedData(#[from] aerocol_colocated::ColocatedDataError),

    /// Resampling error.
    #[error(transparent)]
    Resample(#[from] aerocol_resample::ResampleError),

    /// Temporal resolution error.
    #[error(transparent)]
    TemporalResolution(#[from] aerocol_tstype::TemporalResolutionError),
}

impl ColocateError {
    /// True for errors that must abort a batch run regardless of settings.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ColocateError::Internal { .. })
    }
}

impl From<ndarray::ShapeError> for ColocateError {
    fn from(e: ndarray::ShapeError) -> Self {
        ColocateError::DataDimension {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_data_unit() {
        let e = ColocateError::DataUnit {
            from: "ppb".to_string(),
            to: "m-1".to_string(),
        };
        assert_eq!(e.to_string(), "cannot convert unit 'ppb' to 'm-1'");
    }

    #[test]
    fn display_variable_not_found() {
        let e = ColocateError::VariableNotFound {
            var_name: "od550aer".to_string(),
            source_name: "TM5".to_string(),
        };
        assert_eq!(e.to_string(), "variable 'od550aer' not available in 'TM5'");
    }

    #[test]
    fn only_internal_is_fatal() {
        assert!(ColocateError::Internal { reason: "x".into() }.is_fatal());
        assert!(!ColocateError::Colocation { reason: "x".into() }.is_fatal());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<ColocateError>();
    }
}
