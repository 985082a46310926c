//! Evaluation error types.

/// Errors that can occur while building an evaluation report.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// The evaluation configuration is invalid.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Error from the colocated-data container.
    #[error(transparent)]
    ColocatedData(#[from] aerocol_colocated::ColocatedDataError),

    /// Error from the statistics engine.
    #[error(transparent)]
    Stats(#[from] aerocol_stats::StatsError),
}
