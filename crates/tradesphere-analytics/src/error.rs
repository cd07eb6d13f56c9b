//! Error types for aggregation.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type for aggregation.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while aggregating trades.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Polars DataFrame error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A grouped result held a null where a value was expected
    #[error("Missing value in column {column} at row {row}")]
    MissingValue {
        /// Column name
        column: String,
        /// Row index in the grouped result
        row: usize,
    },

    /// A value could not be converted back into its Rust type
    #[error("Data parsing error: {0}")]
    Parse(String),
}
