//! Historical-simulation Value-at-Risk
//!
//! VaR is read straight off the empirical distribution of recent daily P&L.
//! With confidence level α the estimate is
//!
//! VaR = −Q(P&L, 1 − α)
//!
//! where Q is the sample quantile with linear interpolation between order
//! statistics (h = (n − 1)·p). Losses are negative P&L, so the left tail
//! becomes a positive loss figure. A window whose P&L is mostly positive can
//! produce a negative VaR.

use crate::error::RiskError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Historical VaR configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalVarConfig {
    /// Confidence level α, strictly between 0 and 1 (default: 0.95)
    pub alpha: f64,
    /// Trailing window length in observations (default: 60)
    pub lookback: usize,
    /// Minimum valid observations for a defined estimate (default: 5)
    pub min_observations: usize,
}

impl Default for HistoricalVarConfig {
    fn default() -> Self {
        Self {
            alpha: 0.95,
            lookback: 60,
            min_observations: 5,
        }
    }
}

/// A VaR estimate tagged with the parameters that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarRecord {
    /// Confidence level.
    pub alpha: f64,
    /// Lookback window length.
    pub lookback_days: usize,
    /// Estimated VaR; `None` when the window held too few observations.
    #[serde(rename = "VaR")]
    pub var: Option<f64>,
    /// Valid observations the estimate was computed from.
    #[serde(skip)]
    pub observations: usize,
}

impl VarRecord {
    /// Whether the estimate is defined.
    pub const fn is_defined(&self) -> bool {
        self.var.is_some()
    }
}

/// Trait for VaR estimators over a P&L series
pub trait VarEstimator {
    /// Estimate VaR from a date-ordered P&L series (oldest first)
    fn estimate(&self, pnl: &[f64]) -> VarRecord;
}

/// Historical-simulation VaR estimator
#[derive(Debug, Clone)]
pub struct HistoricalVarEstimator {
    config: HistoricalVarConfig,
}

impl HistoricalVarEstimator {
    /// Create a new estimator with the given configuration
    pub fn new(config: HistoricalVarConfig) -> Result<Self, RiskError> {
        if !(config.alpha > 0.0 && config.alpha < 1.0) {
            return Err(RiskError::InvalidAlpha(config.alpha));
        }
        if config.lookback == 0 {
            return Err(RiskError::InvalidParameter(
                "lookback must be at least 1".to_string(),
            ));
        }
        if config.min_observations == 0 {
            return Err(RiskError::InvalidParameter(
                "min_observations must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Create with default configuration.
    ///
    /// # Errors
    /// Returns an error if the default configuration is invalid (should not happen).
    pub fn try_default() -> Result<Self, RiskError> {
        Self::new(HistoricalVarConfig::default())
    }

    /// Estimator configuration
    pub const fn config(&self) -> &HistoricalVarConfig {
        &self.config
    }

    /// The trailing window: last `lookback` entries, then missing values dropped.
    fn window(&self, pnl: &[f64]) -> Vec<f64> {
        let start = pnl.len().saturating_sub(self.config.lookback);
        pnl[start..].iter().copied().filter(|v| !v.is_nan()).collect()
    }
}

impl VarEstimator for HistoricalVarEstimator {
    fn estimate(&self, pnl: &[f64]) -> VarRecord {
        let mut window = self.window(pnl);
        let observations = window.len();

        let var = if observations < self.config.min_observations {
            warn!(
                observations,
                required = self.config.min_observations,
                "insufficient data for VaR, estimate undefined"
            );
            None
        } else {
            window.sort_by(f64::total_cmp);
            let q = linear_quantile(&window, 1.0 - self.config.alpha);
            debug!(observations, quantile = q, "estimated historical VaR");
            Some(-q)
        };

        VarRecord {
            alpha: self.config.alpha,
            lookback_days: self.config.lookback,
            var,
            observations,
        }
    }
}

/// Quantile of ascending-sorted data with linear interpolation.
///
/// `p` is clamped to [0, 1]. Returns NaN for empty input.
pub fn linear_quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = h - lower as f64;
        sorted[lower] + weight * (sorted[upper] - sorted[lower])
    }
}

/// Historical VaR of `pnl` at confidence `alpha` over the last `lookback` entries.
pub fn historical_var(pnl: &[f64], alpha: f64, lookback: usize) -> Result<VarRecord, RiskError> {
    let estimator = HistoricalVarEstimator::new(HistoricalVarConfig {
        alpha,
        lookback,
        ..Default::default()
    })?;
    Ok(estimator.estimate(pnl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_reference_fixture() {
        // h = 4 * 0.05 = 0.2, Q = -100 + 0.2 * 50 = -90
        let record = historical_var(&[-100.0, -50.0, 0.0, 50.0, 100.0], 0.95, 60).unwrap();
        assert_relative_eq!(record.var.unwrap(), 90.0, epsilon = 1e-12);
        assert_eq!(record.observations, 5);
        assert_eq!(record.lookback_days, 60);
    }

    #[test]
    fn test_input_order_does_not_matter_within_window() {
        let record = historical_var(&[50.0, -100.0, 100.0, 0.0, -50.0], 0.95, 5).unwrap();
        assert_relative_eq!(record.var.unwrap(), 90.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[1.0, 2.0, 3.0, 4.0], 4)]
    #[case(&[1.0, 2.0, f64::NAN, 4.0, 5.0], 4)]
    fn test_fewer_than_five_is_undefined(#[case] pnl: &[f64], #[case] observations: usize) {
        let record = historical_var(pnl, 0.95, 60).unwrap();
        assert!(record.var.is_none());
        assert!(!record.is_defined());
        assert_eq!(record.observations, observations);
    }

    #[test]
    fn test_window_takes_tail_before_dropping_missing() {
        // Last 6 entries hold one NaN: 5 valid observations remain.
        let pnl = [-1e9, -1e9, 1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0];
        let record = historical_var(&pnl, 0.95, 6).unwrap();
        assert_eq!(record.observations, 5);
        // Quantile of [1, 2, 3, 4, 5] at 0.05: h = 0.2
        assert_relative_eq!(record.var.unwrap(), -1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_shorter_series_uses_all_entries() {
        let pnl: Vec<f64> = (1..=10).map(f64::from).collect();
        let record = historical_var(&pnl, 0.9, 250).unwrap();
        assert_eq!(record.observations, 10);
        // h = 9 * 0.1 = 0.9, Q = 1.9, VaR negative for an all-gain window
        assert_relative_eq!(record.var.unwrap(), -1.9, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_invalid_alpha(#[case] alpha: f64) {
        assert!(matches!(
            historical_var(&[1.0; 10], alpha, 10),
            Err(RiskError::InvalidAlpha(_))
        ));
    }

    #[test]
    fn test_zero_lookback_rejected() {
        assert!(matches!(
            historical_var(&[1.0; 10], 0.95, 0),
            Err(RiskError::InvalidParameter(_))
        ));
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(1.0, 4.0)]
    #[case(0.5, 2.5)]
    #[case(0.25, 1.75)]
    fn test_linear_quantile(#[case] p: f64, #[case] expected: f64) {
        assert_relative_eq!(linear_quantile(&[1.0, 2.0, 3.0, 4.0], p), expected);
    }

    #[test]
    fn test_linear_quantile_empty_is_nan() {
        assert!(linear_quantile(&[], 0.5).is_nan());
    }
}
