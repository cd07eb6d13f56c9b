//! Error types for risk estimation.

use thiserror::Error;

/// Errors that can occur during risk estimation
#[derive(Debug, Error)]
pub enum RiskError {
    /// Confidence level outside (0, 1)
    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidAlpha(f64),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
