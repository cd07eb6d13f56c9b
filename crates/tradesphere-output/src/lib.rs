#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tradesphere/tradesphere/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bi;
pub mod export;
pub mod filter;
pub mod format;
pub mod kpi;
pub mod report;

pub use bi::{BiRow, Metric, TidyRow, bi_export, tidy_daily_aggregate, tidy_export};
pub use export::{ExportError, ExportFormat, Exporter, Record};
pub use filter::TradeFilter;
pub use format::{PLACEHOLDER, fmt_cur, fmt_mn};
pub use kpi::{Kpis, last_period_delta};
pub use report::{DashboardReport, ReportBuilder, ReportError, TextStyle};
