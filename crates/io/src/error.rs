//! Error types for aerocol-io.

use std::path::PathBuf;

use aerocol_colocate::ColocateError;

/// Error type for all fallible operations in the aerocol-io crate.
///
/// Covers missing files, NetCDF library failures, layout problems in the
/// files being read, and errors from the data model the readers build.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Filesystem error while scanning for input files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a time value cannot be parsed or is out of range.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },

    /// Returned when an attribute is present but unusable.
    #[error("invalid attribute '{name}': {reason}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Error from building the in-memory data model.
    #[error(transparent)]
    Colocate(#[from] ColocateError),

    /// Error from the colocated-data layer (time units).
    #[error(transparent)]
    ColocatedData(#[from] aerocol_colocated::ColocatedDataError),

    /// Temporal resolution error.
    #[error(transparent)]
    TemporalResolution(#[from] aerocol_tstype::TemporalResolutionError),

    /// Resampling error.
    #[error(transparent)]
    Resample(#[from] aerocol_resample::ResampleError),
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl IoError {
    /// Converts into the error type of the source traits.
    ///
    /// Errors that already are colocation errors pass through unchanged;
    /// everything else becomes [`ColocateError::Read`].
    pub fn into_colocate(self, source_name: &str) -> ColocateError {
        match self {
            IoError::Colocate(e) => e,
            other => ColocateError::Read {
                source_name: source_name.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
