#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tradesphere/tradesphere/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod frame;

pub use aggregate::{
    CounterpartySummary, DailyPnl, Dimension, ExposureRow, ExposureTable, Totals, daily_pnl,
    exposure_tables, summarize_counterparty,
};
pub use error::{AnalyticsError, Result};
pub use frame::TradeFrame;
