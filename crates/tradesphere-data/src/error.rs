//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Required columns are absent from the input table
    #[error("Missing columns in {source_name}: {}", missing.join(", "))]
    Schema {
        /// Name of the table that was checked
        source_name: String,
        /// Every required column that was not found
        missing: Vec<String>,
    },

    /// CSV read or write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid generator or loader configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),
}

impl DataError {
    /// Returns `true` for schema violations, which abort a run.
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}
