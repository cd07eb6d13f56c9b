//! Grouped summaries of cleaned trades.
//!
//! Every summary is recomputed from the frame on each call. Groups exist only
//! for keys that occur in the data: nothing is zero-filled, and dates with no
//! trades are absent from the daily series.

use crate::error::Result;
use crate::frame::{TradeFrame, counts, dates, floats, strings};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use tradesphere_data::CleanTrade;

/// Per-counterparty summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartySummary {
    /// Counterparty name.
    pub counterparty: String,
    /// Sum of notional in millions.
    pub total_exposure_mn: f64,
    /// Number of trade rows.
    pub trades: usize,
    /// Sum of P&L.
    pub pnl_total: f64,
    /// Mean P&L per trade row.
    pub pnl_avg: f64,
}

/// Grouping dimension for exposure tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Group by counterparty.
    Counterparty,
    /// Group by asset class.
    AssetClass,
}

impl Dimension {
    /// Column name of the dimension.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Counterparty => "counterparty",
            Self::AssetClass => "asset_class",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One row of an exposure table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRow {
    /// Dimension value.
    pub key: String,
    /// Sum of notional in millions.
    pub exposure_mn: f64,
}

/// Exposure grouped by one dimension, largest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureTable {
    /// Grouping dimension.
    pub dimension: Dimension,
    /// Rows sorted by exposure descending.
    pub rows: Vec<ExposureRow>,
}

impl ExposureTable {
    /// Total exposure across all rows.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.exposure_mn).sum()
    }

    /// The first `n` rows.
    pub fn top(&self, n: usize) -> &[ExposureRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Portfolio P&L on one trade date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    /// Trade date.
    pub trade_date: NaiveDate,
    /// Sum of P&L for the date.
    pub pnl_total: f64,
}

/// Whole-frame totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of notional in millions.
    pub exposure_mn: f64,
    /// Number of trade rows.
    pub trades: usize,
    /// Number of distinct trade identifiers.
    pub distinct_trade_ids: usize,
    /// Sum of P&L.
    pub pnl_total: f64,
}

/// Value descending, key ascending for ties.
fn descending_with_key() -> SortMultipleOptions {
    SortMultipleOptions::default().with_order_descending_multi([true, false])
}

impl TradeFrame {
    /// Summary per counterparty, sorted by total exposure descending.
    ///
    /// `trades` counts rows, not distinct trade identifiers.
    pub fn counterparty_summary(&self) -> Result<Vec<CounterpartySummary>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let df = self
            .lazy()
            .group_by([col("counterparty")])
            .agg([
                col("notional_mn").sum().alias("total_exposure_mn"),
                col("trade_id").count().alias("trades"),
                col("pnl").sum().alias("pnl_total"),
                col("pnl").mean().alias("pnl_avg"),
            ])
            .sort(["total_exposure_mn", "counterparty"], descending_with_key())
            .collect()?;

        let names = strings(&df, "counterparty")?;
        let exposure = floats(&df, "total_exposure_mn")?;
        let trades = counts(&df, "trades")?;
        let pnl_total = floats(&df, "pnl_total")?;
        let pnl_avg = floats(&df, "pnl_avg")?;

        let rows: Vec<_> = names
            .into_iter()
            .enumerate()
            .map(|(i, counterparty)| CounterpartySummary {
                counterparty,
                total_exposure_mn: exposure[i],
                trades: trades[i],
                pnl_total: pnl_total[i],
                pnl_avg: pnl_avg[i],
            })
            .collect();

        debug!(groups = rows.len(), "computed counterparty summary");
        Ok(rows)
    }

    /// Exposure grouped by `dimension`, sorted descending.
    pub fn exposure_by(&self, dimension: Dimension) -> Result<ExposureTable> {
        if self.is_empty() {
            return Ok(ExposureTable {
                dimension,
                rows: Vec::new(),
            });
        }

        let key = dimension.column();
        let df = self
            .lazy()
            .group_by([col(key)])
            .agg([col("notional_mn").sum().alias("exposure_mn")])
            .sort(["exposure_mn", key], descending_with_key())
            .collect()?;

        let keys = strings(&df, key)?;
        let exposure = floats(&df, "exposure_mn")?;

        Ok(ExposureTable {
            dimension,
            rows: keys
                .into_iter()
                .zip(exposure)
                .map(|(key, exposure_mn)| ExposureRow { key, exposure_mn })
                .collect(),
        })
    }

    /// P&L summed per trade date, ascending by date.
    pub fn daily_pnl(&self) -> Result<Vec<DailyPnl>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let df = self
            .lazy()
            .group_by([col("trade_date")])
            .agg([col("pnl").sum().alias("pnl_total")])
            .sort(["trade_date"], SortMultipleOptions::default())
            .collect()?;

        let days = dates(&df, "trade_date")?;
        let pnl = floats(&df, "pnl_total")?;

        Ok(days
            .into_iter()
            .zip(pnl)
            .map(|(trade_date, pnl_total)| DailyPnl {
                trade_date,
                pnl_total,
            })
            .collect())
    }

    /// Totals over the whole frame.
    pub fn totals(&self) -> Result<Totals> {
        if self.is_empty() {
            return Ok(Totals::default());
        }

        let df = self
            .lazy()
            .select([
                col("notional_mn").sum().alias("exposure_mn"),
                col("trade_id").count().alias("trades"),
                col("trade_id").n_unique().alias("distinct_trade_ids"),
                col("pnl").sum().alias("pnl_total"),
            ])
            .collect()?;

        Ok(Totals {
            exposure_mn: floats(&df, "exposure_mn")?[0],
            trades: counts(&df, "trades")?[0],
            distinct_trade_ids: counts(&df, "distinct_trade_ids")?[0],
            pnl_total: floats(&df, "pnl_total")?[0],
        })
    }
}

/// Counterparty summary of `trades`.
pub fn summarize_counterparty(
    trades: &[CleanTrade],
) -> Result<Vec<CounterpartySummary>> {
    TradeFrame::new(trades)?.counterparty_summary()
}

/// Daily P&L series of `trades`.
pub fn daily_pnl(trades: &[CleanTrade]) -> Result<Vec<DailyPnl>> {
    TradeFrame::new(trades)?.daily_pnl()
}

/// Exposure tables by counterparty and by asset class.
pub fn exposure_tables(
    trades: &[CleanTrade],
) -> Result<(ExposureTable, ExposureTable)> {
    let frame = TradeFrame::new(trades)?;
    Ok((
        frame.exposure_by(Dimension::Counterparty)?,
        frame.exposure_by(Dimension::AssetClass)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tradesphere_data::TradeRecord;

    fn trade(id: i64, cp: &str, ac: &str, day: u32, notional: f64, pnl: f64) -> CleanTrade {
        CleanTrade::from(TradeRecord {
            trade_id: id,
            counterparty: cp.to_string(),
            asset_class: ac.to_string(),
            currency: "USD".to_string(),
            trade_type: "Buy".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            notional,
            pnl,
        })
    }

    fn sample() -> Vec<CleanTrade> {
        vec![
            trade(1, "Bank A", "Equity", 3, 1_000_000.0, 100.0),
            trade(2, "Bank B", "Bond", 1, 4_000_000.0, -300.0),
            trade(3, "Bank A", "FX", 3, 2_000_000.0, 50.0),
            trade(3, "Bank C", "Equity", 2, 500_000.0, 10.0),
            trade(5, "Bank A", "Equity", 1, 250_000.0, -20.0),
        ]
    }

    #[test]
    fn test_counterparty_summary() {
        let summary = summarize_counterparty(&sample()).unwrap();

        let names: Vec<_> = summary.iter().map(|s| s.counterparty.as_str()).collect();
        assert_eq!(names, vec!["Bank B", "Bank A", "Bank C"]);

        let bank_a = &summary[1];
        assert_relative_eq!(bank_a.total_exposure_mn, 3.25);
        assert_eq!(bank_a.trades, 3);
        assert_relative_eq!(bank_a.pnl_total, 130.0);
        assert_relative_eq!(bank_a.pnl_avg, 130.0 / 3.0);
    }

    #[test]
    fn test_exposure_ties_break_by_key() {
        let trades = vec![
            trade(1, "Bank Z", "Bond", 1, 1_000_000.0, 0.0),
            trade(2, "Bank Y", "Bond", 1, 1_000_000.0, 0.0),
        ];
        let table = TradeFrame::new(&trades)
            .unwrap()
            .exposure_by(Dimension::Counterparty)
            .unwrap();
        let keys: Vec<_> = table.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Bank Y", "Bank Z"]);
    }

    #[test]
    fn test_exposure_by_asset_class() {
        let (_, by_asset) = exposure_tables(&sample()).unwrap();

        assert_eq!(by_asset.dimension, Dimension::AssetClass);
        assert_eq!(by_asset.rows[0].key, "Bond");
        assert_relative_eq!(by_asset.rows[0].exposure_mn, 4.0);
        assert_eq!(by_asset.rows[1].key, "FX");
        assert_eq!(by_asset.rows[2].key, "Equity");
        assert_relative_eq!(by_asset.rows[2].exposure_mn, 1.75);
        assert_relative_eq!(by_asset.total(), 7.75);
        assert_eq!(by_asset.top(2).len(), 2);
        assert_eq!(by_asset.top(10).len(), 3);
    }

    #[test]
    fn test_daily_pnl_sorted_ascending_with_gaps() {
        let mut trades = sample();
        trades.push(trade(9, "Bank D", "FX", 10, 1_000_000.0, 7.0));

        let daily = daily_pnl(&trades).unwrap();
        let days: Vec<_> = daily.iter().map(|d| d.trade_date).collect();

        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
            ]
        );
        assert_relative_eq!(daily[0].pnl_total, -320.0);
        assert_relative_eq!(daily[2].pnl_total, 150.0);
        assert_relative_eq!(daily[3].pnl_total, 7.0);
    }

    #[test]
    fn test_totals_count_rows_and_distinct_ids() {
        let totals = TradeFrame::new(&sample()).unwrap().totals().unwrap();

        assert_eq!(totals.trades, 5);
        assert_eq!(totals.distinct_trade_ids, 4);
        assert_relative_eq!(totals.exposure_mn, 7.75);
        assert_relative_eq!(totals.pnl_total, -160.0);
    }

    #[test]
    fn test_empty_input_yields_empty_outputs() {
        let frame = TradeFrame::new(&[]).unwrap();

        assert!(frame.counterparty_summary().unwrap().is_empty());
        assert!(frame.exposure_by(Dimension::Counterparty).unwrap().rows.is_empty());
        assert!(frame.daily_pnl().unwrap().is_empty());
        assert_eq!(frame.totals().unwrap(), Totals::default());
    }
}
