//! Trade record types.
//!
//! [`TradeRecord`] is the raw, fully typed trade as produced by the
//! generator. [`CleanTrade`] is a record that has passed the cleaner and
//! carries the derived fields. Both serialize to flat CSV rows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Columns every raw trade table must contain.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "trade_id",
    "counterparty",
    "asset_class",
    "currency",
    "trade_type",
    "trade_date",
    "notional",
    "pnl",
];

/// Counterparties drawn by the generator.
pub const COUNTERPARTIES: [&str; 4] = ["Bank A", "Bank B", "Bank C", "Bank D"];

/// Asset classes drawn by the generator.
pub const ASSET_CLASSES: [&str; 4] = ["Equity", "Bond", "FX", "Commodity"];

/// Settlement currencies drawn by the generator.
pub const CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "JPY"];

/// Trade sides drawn by the generator.
pub const TRADE_TYPES: [&str; 2] = ["Buy", "Sell"];

const MILLION: f64 = 1_000_000.0;

/// A raw trade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Trade identifier. Not unique across a dataset.
    pub trade_id: i64,
    /// Counterparty name.
    pub counterparty: String,
    /// Asset class.
    pub asset_class: String,
    /// Settlement currency.
    pub currency: String,
    /// Trade side (`Buy` or `Sell`).
    pub trade_type: String,
    /// Trade date.
    pub trade_date: NaiveDate,
    /// Gross notional.
    pub notional: f64,
    /// Profit and loss attributed to the trade.
    pub pnl: f64,
}

/// A trade that passed validation, with derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanTrade {
    /// Trade identifier.
    pub trade_id: i64,
    /// Counterparty name.
    pub counterparty: String,
    /// Asset class.
    pub asset_class: String,
    /// Settlement currency.
    pub currency: String,
    /// Trade side.
    pub trade_type: String,
    /// Trade date.
    pub trade_date: NaiveDate,
    /// Gross notional.
    pub notional: f64,
    /// Profit and loss.
    pub pnl: f64,
    /// Notional in millions.
    pub notional_mn: f64,
    /// Calendar year of `trade_date`.
    pub year: i32,
    /// Calendar month of `trade_date` (1-12).
    pub month: u32,
}

impl From<TradeRecord> for CleanTrade {
    fn from(record: TradeRecord) -> Self {
        Self {
            notional_mn: record.notional / MILLION,
            year: record.trade_date.year(),
            month: record.trade_date.month(),
            trade_id: record.trade_id,
            counterparty: record.counterparty,
            asset_class: record.asset_class,
            currency: record.currency,
            trade_type: record.trade_type,
            trade_date: record.trade_date,
            notional: record.notional,
            pnl: record.pnl,
        }
    }
}

impl CleanTrade {
    /// The `YYYY-MM` period of the trade date.
    pub fn yyyymm(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}
