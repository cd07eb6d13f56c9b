//! Error types for pipeline runs.

use thiserror::Error;
use tradesphere_analytics::AnalyticsError;
use tradesphere_data::DataError;
use tradesphere_output::{ExportError, ReportError};
use tradesphere_risk::RiskError;

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the pipeline or loading the dashboard.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Data loading, cleaning or generation error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Aggregation error
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Risk estimation error
    #[error(transparent)]
    Risk(#[from] RiskError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report error
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A table a stage depends on has not been produced yet
    #[error("Missing input {path}: run the `{stage}` stage first")]
    MissingInput {
        /// Expected file
        path: String,
        /// Stage that writes it
        stage: &'static str,
    },
}

impl PipelineError {
    /// Returns `true` for schema violations in the input data.
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Data(e) if e.is_schema())
    }
}
