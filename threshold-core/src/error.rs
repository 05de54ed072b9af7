//! Threshold error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThresholdError {
    /// A required column is missing or the header row is ambiguous.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A value could not be interpreted as its expected type.
    #[error("Parse error at line {line}, column '{column}': {reason}")]
    Parse {
        line: u64,
        column: String,
        reason: String,
    },

    /// No events, or no daily thresholds to aggregate.
    #[error("No data to report: {0}")]
    EmptyDataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ThresholdError {
    /// True for errors that should be shown as an informative empty result
    /// rather than aborting the caller.
    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, ThresholdError::EmptyDataset(_))
    }
}

/// Result type alias for threshold operations.
pub type ThresholdResult<T> = Result<T, ThresholdError>;
