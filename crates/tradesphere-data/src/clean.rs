//! Cleaning and validation of raw trade tables.
//!
//! Cleaning is all-or-nothing per row: a row survives only if every required
//! field coerces to its type. Rows that fail are reported as
//! [`CoercionFailure`]s and never reach the aggregation layer.

use crate::error::{DataError, Result};
use crate::table::RawTable;
use crate::trade::{CleanTrade, REQUIRED_COLUMNS, TradeRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y", "%d-%b-%Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A row that was dropped because one of its cells failed coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionFailure {
    /// Zero-based data row index in the raw table.
    pub row: usize,
    /// First column that failed.
    pub column: String,
    /// Offending cell value.
    pub value: String,
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: column '{}' has invalid value '{}'",
            self.row, self.column, self.value
        )
    }
}

/// Result of cleaning a raw table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanOutcome {
    /// Valid trades, in input order.
    pub trades: Vec<CleanTrade>,
    /// Rows that were dropped.
    pub dropped: Vec<CoercionFailure>,
}

impl CleanOutcome {
    /// Number of rows that were read.
    pub fn rows_read(&self) -> usize {
        self.trades.len() + self.dropped.len()
    }
}

/// Parse a date permissively. Time-of-day components are discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Parse a finite float. Blank, non-numeric, NaN and infinite values are missing.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse an integer identifier. Floats with no fractional part are accepted.
pub fn parse_id(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        parse_number(value)
            .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
    })
}

fn parse_category(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Column positions of the required fields in a raw table.
#[derive(Debug, Clone, Copy)]
struct Layout {
    idx: [usize; REQUIRED_COLUMNS.len()],
}

impl Layout {
    fn resolve(table: &RawTable) -> Result<Self> {
        let mut idx = [0; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            match table.column_index(name) {
                Some(i) => *slot = i,
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self { idx })
        } else {
            Err(DataError::Schema {
                source_name: table.name.clone(),
                missing,
            })
        }
    }

    fn coerce(&self, row_index: usize, row: &[String]) -> std::result::Result<TradeRecord, CoercionFailure> {
        let cell = |pos: usize| row.get(self.idx[pos]).map_or("", String::as_str);
        let fail = |pos: usize| CoercionFailure {
            row: row_index,
            column: REQUIRED_COLUMNS[pos].to_string(),
            value: cell(pos).to_string(),
        };

        Ok(TradeRecord {
            trade_id: parse_id(cell(0)).ok_or_else(|| fail(0))?,
            counterparty: parse_category(cell(1)).ok_or_else(|| fail(1))?,
            asset_class: parse_category(cell(2)).ok_or_else(|| fail(2))?,
            currency: parse_category(cell(3)).ok_or_else(|| fail(3))?,
            trade_type: parse_category(cell(4)).ok_or_else(|| fail(4))?,
            trade_date: parse_date(cell(5)).ok_or_else(|| fail(5))?,
            notional: parse_number(cell(6)).ok_or_else(|| fail(6))?,
            pnl: parse_number(cell(7)).ok_or_else(|| fail(7))?,
        })
    }
}

/// Coerce every row of a raw table.
///
/// Returns one `Result` per input row, in order.
///
/// # Errors
///
/// Returns [`DataError::Schema`] if any required column is absent.
pub fn coerce_rows(
    table: &RawTable,
) -> Result<Vec<std::result::Result<TradeRecord, CoercionFailure>>> {
    let layout = Layout::resolve(table)?;
    Ok(table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| layout.coerce(i, row))
        .collect())
}

/// Clean a raw trade table.
///
/// Extra columns are ignored. Previously derived columns (`notional_mn`,
/// `year`, `month`) are ignored and derived again, so cleaning a cleaned
/// table is a no-op.
///
/// # Errors
///
/// Returns [`DataError::Schema`] if any required column is absent.
pub fn clean_trades(table: &RawTable) -> Result<CleanOutcome> {
    let mut outcome = CleanOutcome::default();

    for row in coerce_rows(table)? {
        match row {
            Ok(record) => outcome.trades.push(CleanTrade::from(record)),
            Err(failure) => {
                debug!(%failure, "dropping row");
                outcome.dropped.push(failure);
            }
        }
    }

    info!(
        source = %table.name,
        read = outcome.rows_read(),
        kept = outcome.trades.len(),
        dropped = outcome.dropped.len(),
        "cleaned trades"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HEADER: &str = "trade_id,counterparty,asset_class,currency,trade_type,trade_date,notional,pnl";

    fn table(body: &str) -> RawTable {
        RawTable::from_reader("test", format!("{HEADER}\n{body}").as_bytes()).unwrap()
    }

    #[rstest]
    #[case("2024-01-15", Some((2024, 1, 15)))]
    #[case("2024/01/15", Some((2024, 1, 15)))]
    #[case("20240115", Some((2024, 1, 15)))]
    #[case("01/15/2024", Some((2024, 1, 15)))]
    #[case("15-Jan-2024", Some((2024, 1, 15)))]
    #[case("2024-01-15 00:00:00", Some((2024, 1, 15)))]
    #[case("2024-01-15T13:45:00", Some((2024, 1, 15)))]
    #[case("2024-01-15T13:45:00+02:00", Some((2024, 1, 15)))]
    #[case(" 2024-01-15 ", Some((2024, 1, 15)))]
    #[case("not-a-date", None)]
    #[case("2024-13-01", None)]
    #[case("", None)]
    fn test_parse_date(#[case] input: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_date(input), expected);
    }

    #[rstest]
    #[case("1500000", Some(1_500_000.0))]
    #[case(" -12.5 ", Some(-12.5))]
    #[case("1e6", Some(1_000_000.0))]
    #[case("abc", None)]
    #[case("NaN", None)]
    #[case("inf", None)]
    #[case("", None)]
    fn test_parse_number(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_number(input), expected);
    }

    #[rstest]
    #[case("123456", Some(123456))]
    #[case("123456.0", Some(123456))]
    #[case("123456.5", None)]
    #[case("id-1", None)]
    fn test_parse_id(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_id(input), expected);
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let raw = RawTable::from_reader(
            "partial.csv",
            "trade_id,counterparty,trade_date,notional\n1,Bank A,2024-01-02,100\n".as_bytes(),
        )
        .unwrap();

        let err = clean_trades(&raw).unwrap_err();
        match err {
            DataError::Schema {
                source_name,
                missing,
            } => {
                assert_eq!(source_name, "partial.csv");
                assert_eq!(missing, vec!["asset_class", "currency", "trade_type", "pnl"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_date_drops_only_that_row() {
        let raw = table(
            "1,Bank A,Equity,USD,Buy,2024-01-02,1000000,50\n\
             2,Bank B,Bond,EUR,Sell,not-a-date,2000000,-20\n\
             3,Bank C,FX,GBP,Buy,2024-01-03,3000000,10\n",
        );

        let outcome = clean_trades(&raw).unwrap();

        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].row, 1);
        assert_eq!(outcome.dropped[0].column, "trade_date");
        assert_eq!(outcome.dropped[0].value, "not-a-date");

        assert_eq!(outcome.trades[0].trade_id, 1);
        assert_eq!(outcome.trades[0].notional, 1_000_000.0);
        assert_eq!(outcome.trades[1].trade_id, 3);
        assert_eq!(outcome.trades[1].pnl, 10.0);
    }

    #[test]
    fn test_blank_category_and_bad_numeric_are_dropped() {
        let raw = table(
            "1,,Equity,USD,Buy,2024-01-02,1000000,50\n\
             2,Bank B,Bond,EUR,Sell,2024-01-02,lots,-20\n\
             3,Bank C,FX,GBP,Buy,2024-01-03,3000000,\n",
        );

        let outcome = clean_trades(&raw).unwrap();

        assert!(outcome.trades.is_empty());
        let columns: Vec<_> = outcome.dropped.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["counterparty", "notional", "pnl"]);
    }

    #[test]
    fn test_extra_columns_and_column_order_are_ignored() {
        let raw = RawTable::from_reader(
            "reordered",
            "pnl,notional,trade_date,trade_type,currency,asset_class,counterparty,trade_id,notional_mn\n\
             5,2000000,2024-02-29,Sell,JPY,Commodity,Bank D,42,999\n"
                .as_bytes(),
        )
        .unwrap();

        let outcome = clean_trades(&raw).unwrap();
        let trade = &outcome.trades[0];

        assert_eq!(trade.trade_id, 42);
        assert_eq!(trade.counterparty, "Bank D");
        assert_eq!(trade.notional_mn, 2.0);
        assert_eq!(trade.month, 2);
    }
}
