//! Headline figures for the dashboard.

use crate::format::{fmt_count, fmt_cur, fmt_delta, fmt_mn};
use serde::{Deserialize, Serialize};
use tradesphere_analytics::{AnalyticsError, DailyPnl, TradeFrame};
use tradesphere_data::CleanTrade;
use tradesphere_risk::VarRecord;

/// Period length, in daily observations, of the P&L delta.
pub const DELTA_PERIOD: usize = 7;

/// KPI block over a filtered trade set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Sum of notional in millions.
    pub total_exposure_mn: f64,
    /// Number of trade rows.
    pub trades: usize,
    /// Number of distinct trade identifiers.
    pub distinct_trade_ids: usize,
    /// Sum of P&L.
    pub pnl_total: f64,
    /// Last period's P&L minus the prior period's, when enough days exist.
    pub pnl_delta: Option<f64>,
    /// Confidence level of the VaR figure, when one was loaded.
    pub var_alpha: Option<f64>,
    /// Portfolio VaR; `None` when undefined or absent.
    pub var: Option<f64>,
}

impl Kpis {
    /// Compute KPIs for `trades`.
    ///
    /// `daily` is the full stored daily P&L series, independent of the date
    /// range, and `var` the stored VaR record if one exists.
    pub fn compute(
        trades: &[CleanTrade],
        daily: &[DailyPnl],
        var: Option<&VarRecord>,
    ) -> Result<Self, AnalyticsError> {
        let totals = TradeFrame::new(trades)?.totals()?;
        let series: Vec<f64> = daily.iter().map(|d| d.pnl_total).collect();

        Ok(Self {
            total_exposure_mn: totals.exposure_mn,
            trades: totals.trades,
            distinct_trade_ids: totals.distinct_trade_ids,
            pnl_total: totals.pnl_total,
            pnl_delta: last_period_delta(&series, DELTA_PERIOD),
            var_alpha: var.map(|v| v.alpha),
            var: var.and_then(|v| v.var),
        })
    }

    /// Label and rendered value pairs, in display order.
    pub fn rows(&self) -> Vec<(String, String)> {
        let var_label = self.var_alpha.map_or_else(
            || "Portfolio VaR".to_string(),
            |alpha| format!("Portfolio VaR ({:.0}%)", alpha * 100.0),
        );
        vec![
            ("Total Exposure".to_string(), fmt_mn(Some(self.total_exposure_mn))),
            ("Total Trades".to_string(), fmt_count(self.trades)),
            ("Distinct Trade IDs".to_string(), fmt_count(self.distinct_trade_ids)),
            ("Total P&L".to_string(), fmt_cur(Some(self.pnl_total))),
            (
                format!("P&L Delta ({DELTA_PERIOD}d)"),
                fmt_delta(self.pnl_delta),
            ),
            (var_label, fmt_cur(self.var)),
        ]
    }
}

/// Sum of the last `days` values minus the sum of the first `days` values
/// of the trailing `2 * days` window.
///
/// Below `2 * days` values the two windows overlap. Returns `None` unless at
/// least `days + 1` values exist.
pub fn last_period_delta(series: &[f64], days: usize) -> Option<f64> {
    if days == 0 || series.len() < days + 1 {
        return None;
    }
    let window = &series[series.len().saturating_sub(2 * days)..];
    let current: f64 = series[series.len() - days..].iter().sum();
    let previous: f64 = window[..days].iter().sum();
    Some(current - previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rstest::rstest;
    use tradesphere_data::TradeRecord;

    fn trade(id: i64, notional: f64, pnl: f64) -> CleanTrade {
        CleanTrade::from(TradeRecord {
            trade_id: id,
            counterparty: "Bank A".to_string(),
            asset_class: "Bond".to_string(),
            currency: "GBP".to_string(),
            trade_type: "Sell".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            notional,
            pnl,
        })
    }

    #[rstest]
    #[case(&[1.0; 7], None)]
    #[case(&[1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0], Some(1.0))]
    #[case(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0], Some(21.0))]
    #[case(&[1.0; 14], Some(0.0))]
    #[case(&[5.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0], Some(7.0))]
    fn test_last_period_delta(#[case] series: &[f64], #[case] expected: Option<f64>) {
        assert_eq!(last_period_delta(series, 7), expected);
    }

    #[test]
    fn test_kpis_count_rows_not_ids() {
        let trades = vec![
            trade(7, 1_000_000.0, 10.0),
            trade(7, 2_000_000.0, -5.0),
            trade(8, 500_000.0, 1.0),
        ];
        let var = VarRecord {
            alpha: 0.95,
            lookback_days: 60,
            var: Some(1234.0),
            observations: 60,
        };
        let kpis = Kpis::compute(&trades, &[], Some(&var)).unwrap();

        assert_eq!(kpis.trades, 3);
        assert_eq!(kpis.distinct_trade_ids, 2);
        assert_relative_eq!(kpis.total_exposure_mn, 3.5);
        assert_relative_eq!(kpis.pnl_total, 6.0);
        assert_eq!(kpis.pnl_delta, None);
        assert_eq!(kpis.var, Some(1234.0));
    }

    #[test]
    fn test_empty_selection_renders() {
        let kpis = Kpis::compute(&[], &[], None).unwrap();
        assert_eq!(kpis, Kpis::default());

        let rows = kpis.rows();
        assert_eq!(rows[0].1, "0.00 mn");
        assert_eq!(rows[1].1, "0");
        assert_eq!(rows[4].1, "—");
        assert_eq!(rows[5], ("Portfolio VaR".to_string(), "—".to_string()));
    }

    #[test]
    fn test_undefined_var_renders_placeholder() {
        let var = VarRecord {
            alpha: 0.99,
            lookback_days: 60,
            var: None,
            observations: 1,
        };
        let kpis = Kpis::compute(&[], &[], Some(&var)).unwrap();
        assert_eq!(
            kpis.rows()[5],
            ("Portfolio VaR (99%)".to_string(), "—".to_string())
        );
    }
}
