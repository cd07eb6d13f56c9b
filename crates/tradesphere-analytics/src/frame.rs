//! Columnar view of cleaned trades.

use crate::error::{AnalyticsError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tradesphere_data::CleanTrade;

/// Days from 0001-01-01 to 1970-01-01; polars stores dates as days since the epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Cleaned trades held as a polars `DataFrame`.
///
/// Columns: `trade_id` (i64), `counterparty`, `asset_class`, `currency`,
/// `trade_type` (string), `trade_date` (date), `notional`, `pnl`,
/// `notional_mn` (f64).
#[derive(Debug, Clone)]
pub struct TradeFrame {
    df: DataFrame,
}

impl TradeFrame {
    /// Build a frame from cleaned trades.
    pub fn new(trades: &[CleanTrade]) -> Result<Self> {
        let trade_ids: Vec<i64> = trades.iter().map(|t| t.trade_id).collect();
        let counterparties: Vec<&str> = trades.iter().map(|t| t.counterparty.as_str()).collect();
        let asset_classes: Vec<&str> = trades.iter().map(|t| t.asset_class.as_str()).collect();
        let currencies: Vec<&str> = trades.iter().map(|t| t.currency.as_str()).collect();
        let trade_types: Vec<&str> = trades.iter().map(|t| t.trade_type.as_str()).collect();
        let dates: Vec<i32> = trades
            .iter()
            .map(|t| t.trade_date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
            .collect();
        let notionals: Vec<f64> = trades.iter().map(|t| t.notional).collect();
        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
        let notionals_mn: Vec<f64> = trades.iter().map(|t| t.notional_mn).collect();

        let df = DataFrame::new(vec![
            Column::new("trade_id".into(), trade_ids),
            Column::new("counterparty".into(), counterparties),
            Column::new("asset_class".into(), asset_classes),
            Column::new("currency".into(), currencies),
            Column::new("trade_type".into(), trade_types),
            Column::new("trade_date".into(), dates).cast(&DataType::Date)?,
            Column::new("notional".into(), notionals),
            Column::new("pnl".into(), pnls),
            Column::new("notional_mn".into(), notionals_mn),
        ])?;

        Ok(Self { df })
    }

    /// Number of trades in the frame.
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Whether the frame holds no trades.
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// The underlying frame.
    pub const fn df(&self) -> &DataFrame {
        &self.df
    }

    /// A lazy query over the frame.
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }
}

pub(crate) fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| AnalyticsError::MissingValue {
        column: column.to_string(),
        row,
    })
}

/// Read a string column.
pub(crate) fn strings(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values = df.column(column)?.str()?;
    (0..df.height())
        .map(|i| required(values.get(i), column, i).map(str::to_string))
        .collect()
}

/// Read a float column.
pub(crate) fn floats(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let values = df.column(column)?.f64()?;
    (0..df.height())
        .map(|i| required(values.get(i), column, i))
        .collect()
}

/// Read an integer-like column (including counts) as `usize`.
pub(crate) fn counts(df: &DataFrame, column: &str) -> Result<Vec<usize>> {
    let values = df.column(column)?.cast(&DataType::Int64)?;
    let values = values.i64()?;
    (0..df.height())
        .map(|i| {
            let v = required(values.get(i), column, i)?;
            usize::try_from(v).map_err(|e| AnalyticsError::Parse(format!("{column}[{i}]: {e}")))
        })
        .collect()
}

/// Read a date column.
pub(crate) fn dates(df: &DataFrame, column: &str) -> Result<Vec<NaiveDate>> {
    let values = df.column(column)?.cast(&DataType::Int32)?;
    let values = values.i32()?;
    (0..df.height())
        .map(|i| {
            let days = required(values.get(i), column, i)?;
            NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE).ok_or_else(|| {
                AnalyticsError::Parse(format!("{column}[{i}]: day {days} out of range"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradesphere_data::TradeRecord;

    fn trade(id: i64, day: u32) -> CleanTrade {
        CleanTrade::from(TradeRecord {
            trade_id: id,
            counterparty: "Bank A".to_string(),
            asset_class: "FX".to_string(),
            currency: "EUR".to_string(),
            trade_type: "Sell".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            notional: 1_500_000.0,
            pnl: 12.0,
        })
    }

    #[test]
    fn test_frame_schema() {
        let frame = TradeFrame::new(&[trade(1, 2), trade(2, 3)]).unwrap();
        let df = frame.df();

        assert_eq!(frame.len(), 2);
        assert_eq!(df.column("trade_date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("trade_id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("notional_mn").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_dates_round_trip_through_frame() {
        let frame = TradeFrame::new(&[trade(1, 2), trade(2, 31)]).unwrap();
        let back = dates(frame.df(), "trade_date").unwrap();
        assert_eq!(
            back,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_dates_stored_as_days_since_epoch() {
        let frame = TradeFrame::new(&[trade(1, 2)]).unwrap();
        let days = frame
            .df()
            .column("trade_date")
            .unwrap()
            .cast(&DataType::Int32)
            .unwrap();

        // 2024-05-02
        assert_eq!(days.i32().unwrap().get(0), Some(19_845));
    }

    #[test]
    fn test_empty_frame() {
        let frame = TradeFrame::new(&[]).unwrap();
        assert!(frame.is_empty());
    }
}
