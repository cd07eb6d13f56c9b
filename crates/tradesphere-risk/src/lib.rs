#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tradesphere/tradesphere/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod var;

// Re-export main types
pub use error::RiskError;
pub use var::{
    HistoricalVarConfig, HistoricalVarEstimator, VarEstimator, VarRecord, historical_var,
    linear_quantile,
};
