//! Dashboard filters over cleaned trades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tradesphere_data::CleanTrade;

/// Inclusive date range plus optional include-lists, combined with AND.
///
/// An empty include-list places no constraint on its dimension, and an open
/// date bound is unbounded on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFilter {
    /// First date included.
    pub start: Option<NaiveDate>,
    /// Last date included.
    pub end: Option<NaiveDate>,
    /// Counterparties to keep.
    pub counterparties: Vec<String>,
    /// Asset classes to keep.
    pub asset_classes: Vec<String>,
}

impl TradeFilter {
    /// A filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first date included.
    pub const fn start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the last date included.
    pub const fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Restrict to the given counterparties.
    pub fn counterparties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.counterparties = names.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given asset classes.
    pub fn asset_classes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_classes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `date` falls in the date range.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Whether `trade` passes every constraint.
    pub fn matches(&self, trade: &CleanTrade) -> bool {
        self.contains_date(trade.trade_date)
            && includes(&self.counterparties, &trade.counterparty)
            && includes(&self.asset_classes, &trade.asset_class)
    }

    /// Trades passing the filter, in input order.
    pub fn apply(&self, trades: &[CleanTrade]) -> Vec<CleanTrade> {
        trades.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

fn includes(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|v| v == value)
}
