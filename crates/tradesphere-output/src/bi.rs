//! BI-ready exports.
//!
//! The wide export flattens each cleaned trade into one row with a `yyyymm`
//! period column. The tidy (long) export melts the three measures into
//! `(metric, value)` pairs, and the daily aggregate sums tidy values per
//! dimension combination and date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tradesphere_data::CleanTrade;

/// One row of the wide BI export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiRow {
    /// Trade date.
    pub trade_date: NaiveDate,
    /// `YYYY-MM` period of the trade date.
    pub yyyymm: String,
    /// Counterparty name.
    pub counterparty: String,
    /// Asset class.
    pub asset_class: String,
    /// Settlement currency.
    pub currency: String,
    /// Trade side.
    pub trade_type: String,
    /// Gross notional.
    pub notional: f64,
    /// Notional in millions.
    pub notional_mn: f64,
    /// Profit and loss.
    pub pnl: f64,
}

impl From<&CleanTrade> for BiRow {
    fn from(trade: &CleanTrade) -> Self {
        Self {
            trade_date: trade.trade_date,
            yyyymm: trade.yyyymm(),
            counterparty: trade.counterparty.clone(),
            asset_class: trade.asset_class.clone(),
            currency: trade.currency.clone(),
            trade_type: trade.trade_type.clone(),
            notional: trade.notional,
            notional_mn: trade.notional_mn,
            pnl: trade.pnl,
        }
    }
}

/// Measure carried by a tidy row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Gross notional.
    Notional,
    /// Notional in millions.
    NotionalMn,
    /// Profit and loss.
    Pnl,
}

impl Metric {
    /// Melt order of the measures.
    pub const ALL: [Self; 3] = [Self::Notional, Self::NotionalMn, Self::Pnl];

    /// Column name of the measure.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Notional => "notional",
            Self::NotionalMn => "notional_mn",
            Self::Pnl => "pnl",
        }
    }

    fn value(&self, row: &BiRow) -> f64 {
        match self {
            Self::Notional => row.notional,
            Self::NotionalMn => row.notional_mn,
            Self::Pnl => row.pnl,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the tidy export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    /// Trade date.
    pub trade_date: NaiveDate,
    /// `YYYY-MM` period of the trade date.
    pub yyyymm: String,
    /// Counterparty name.
    pub counterparty: String,
    /// Asset class.
    pub asset_class: String,
    /// Settlement currency.
    pub currency: String,
    /// Trade side.
    pub trade_type: String,
    /// Measure name.
    pub metric: Metric,
    /// Measure value.
    pub value: f64,
}

/// Wide export, one row per cleaned trade in input order.
pub fn bi_export(trades: &[CleanTrade]) -> Vec<BiRow> {
    trades.iter().map(BiRow::from).collect()
}

/// Tidy export of wide rows.
///
/// Rows are emitted measure by measure: every `notional` row first, then
/// every `notional_mn` row, then every `pnl` row, each block in input order.
pub fn tidy_export(rows: &[BiRow]) -> Vec<TidyRow> {
    let mut tidy = Vec::with_capacity(rows.len() * Metric::ALL.len());
    for metric in Metric::ALL {
        tidy.extend(rows.iter().map(|row| TidyRow {
            trade_date: row.trade_date,
            yyyymm: row.yyyymm.clone(),
            counterparty: row.counterparty.clone(),
            asset_class: row.asset_class.clone(),
            currency: row.currency.clone(),
            trade_type: row.trade_type.clone(),
            metric,
            value: metric.value(row),
        }));
    }
    tidy
}

type TidyKey = (NaiveDate, String, String, String, String, String, Metric);

/// Tidy rows summed per `(trade_date, yyyymm, counterparty, asset_class,
/// currency, trade_type, metric)`, ascending by that key.
pub fn tidy_daily_aggregate(tidy: &[TidyRow]) -> Vec<TidyRow> {
    let mut groups: BTreeMap<TidyKey, f64> = BTreeMap::new();
    for row in tidy {
        let key = (
            row.trade_date,
            row.yyyymm.clone(),
            row.counterparty.clone(),
            row.asset_class.clone(),
            row.currency.clone(),
            row.trade_type.clone(),
            row.metric,
        );
        *groups.entry(key).or_insert(0.0) += row.value;
    }

    groups
        .into_iter()
        .map(
            |((trade_date, yyyymm, counterparty, asset_class, currency, trade_type, metric), value)| {
                TidyRow {
                    trade_date,
                    yyyymm,
                    counterparty,
                    asset_class,
                    currency,
                    trade_type,
                    metric,
                    value,
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tradesphere_data::TradeRecord;

    fn trade(id: i64, cp: &str, month: u32, day: u32, notional: f64, pnl: f64) -> CleanTrade {
        CleanTrade::from(TradeRecord {
            trade_id: id,
            counterparty: cp.to_string(),
            asset_class: "Equity".to_string(),
            currency: "USD".to_string(),
            trade_type: "Buy".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            notional,
            pnl,
        })
    }

    #[test]
    fn test_wide_export_period() {
        let rows = bi_export(&[trade(1, "Bank A", 2, 29, 3_000_000.0, 5.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].yyyymm, "2024-02");
        assert_relative_eq!(rows[0].notional_mn, 3.0);
    }

    #[test]
    fn test_tidy_is_measure_major() {
        let wide = bi_export(&[
            trade(1, "Bank A", 1, 2, 1_000_000.0, 10.0),
            trade(2, "Bank B", 1, 3, 2_000_000.0, -4.0),
        ]);
        let tidy = tidy_export(&wide);

        assert_eq!(tidy.len(), 6);
        let metrics: Vec<_> = tidy.iter().map(|r| r.metric).collect();
        assert_eq!(
            metrics,
            vec![
                Metric::Notional,
                Metric::Notional,
                Metric::NotionalMn,
                Metric::NotionalMn,
                Metric::Pnl,
                Metric::Pnl,
            ]
        );
        assert_eq!(tidy[0].counterparty, "Bank A");
        assert_eq!(tidy[1].counterparty, "Bank B");
        assert_relative_eq!(tidy[3].value, 2.0);
        assert_relative_eq!(tidy[5].value, -4.0);
    }

    #[test]
    fn test_daily_aggregate_sums_matching_keys() {
        let wide = bi_export(&[
            trade(1, "Bank B", 1, 3, 1_000_000.0, 10.0),
            trade(2, "Bank A", 1, 3, 1_000_000.0, 1.0),
            trade(3, "Bank A", 1, 3, 500_000.0, 2.0),
            trade(4, "Bank A", 1, 2, 100_000.0, 3.0),
        ]);
        let agg = tidy_daily_aggregate(&tidy_export(&wide));

        // Three distinct (date, counterparty) combinations, three metrics each.
        assert_eq!(agg.len(), 9);

        assert_eq!(agg[0].trade_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(agg[0].metric, Metric::Notional);

        let bank_a_pnl = agg
            .iter()
            .find(|r| {
                r.counterparty == "Bank A"
                    && r.trade_date.to_string() == "2024-01-03"
                    && r.metric == Metric::Pnl
            })
            .unwrap();
        assert_relative_eq!(bank_a_pnl.value, 3.0);

        // Bank A sorts before Bank B on the same date.
        let on_third: Vec<_> = agg
            .iter()
            .filter(|r| r.trade_date.to_string() == "2024-01-03")
            .map(|r| r.counterparty.as_str())
            .collect();
        assert_eq!(on_third[0], "Bank A");
        assert_eq!(on_third[5], "Bank B");
    }

    #[test]
    fn test_metric_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Metric::NotionalMn).unwrap(),
            "\"notional_mn\""
        );
        assert_eq!(Metric::Pnl.to_string(), "pnl");
    }
}
