//! Error types for the aerocol-colocated crate.

use std::path::PathBuf;

/// Error type for all fallible operations in the aerocol-colocated crate.
///
/// Covers layout violations of the paired array, missing coordinates or
/// metadata, filters that leave nothing to work with, and NetCDF/table
/// persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum ColocatedDataError {
    /// Returned when the paired array violates the fixed axis layout.
    #[error("invalid data dimensions: {reason}")]
    DataDimension {
        /// Description of the violation.
        reason: String,
    },

    /// Returned when a coordinate or metadata entry needed by an operation is absent.
    #[error("colocated data has no '{name}'")]
    MissingAttribute {
        /// Name of the missing attribute.
        name: &'static str,
    },

    /// Returned when filtering leaves no data or the filter geometry is unsupported.
    #[error("data coverage error: {reason}")]
    DataCoverage {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an operation is not available for this layout.
    #[error("{operation} is not implemented for {layout} data")]
    NotImplemented {
        /// Name of the operation.
        operation: &'static str,
        /// Layout the operation was attempted on.
        layout: &'static str,
    },

    /// Returned when a region name is not defined.
    #[error("unknown region '{name}'")]
    UnknownRegion {
        /// The unrecognised region name.
        name: String,
    },

    /// Returned when a colocated-data filename does not follow the naming template.
    #[error("invalid colocated-data filename '{name}': {reason}")]
    InvalidFilename {
        /// Offending filename.
        name: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Returned when a variable name is not part of the container.
    #[error("variable '{name}' not found in colocated data")]
    UnknownVariable {
        /// Requested variable.
        name: String,
    },

    /// Returned when the container's resolution does not support an operation.
    #[error("unsupported operation: {reason}")]
    Unsupported {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a time value cannot be encoded or decoded.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time problem.
        reason: String,
    },

    /// Returned when a file lacks a required variable.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path of the inspected file.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when metadata cannot be (de)serialised.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Statistics error.
    #[error(transparent)]
    Stats(#[from] aerocol_stats::StatsError),

    /// Resampling error.
    #[error(transparent)]
    Resample(#[from] aerocol_resample::ResampleError),

    /// Temporal resolution error.
    #[error(transparent)]
    TemporalResolution(#[from] aerocol_tstype::TemporalResolutionError),
}

impl From<netcdf::Error> for ColocatedDataError {
    fn from(e: netcdf::Error) -> Self {
        ColocatedDataError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ColocatedDataError {
    fn from(e: serde_json::Error) -> Self {
        ColocatedDataError::Serialization {
            reason: e.to_string(),
        }
    }
}

impl From<ndarray::ShapeError> for ColocatedDataError {
    fn from(e: ndarray::ShapeError) -> Self {
        ColocatedDataError::DataDimension {
            reason: e.to_string(),
        }
    }
}
