#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tradesphere/tradesphere/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod clean;
pub mod error;
pub mod generator;
pub mod table;
pub mod trade;

pub use cache::{CacheStats, TableCache};
pub use clean::{CleanOutcome, CoercionFailure, clean_trades};
pub use error::{DataError, Result};
pub use generator::{GeneratorConfig, TradeGenerator, generate_trades};
pub use table::{RawTable, read_records};
pub use trade::{CleanTrade, REQUIRED_COLUMNS, TradeRecord};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
