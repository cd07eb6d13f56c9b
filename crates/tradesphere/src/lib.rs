#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tradesphere/tradesphere/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use tradesphere_analytics as analytics;
pub use tradesphere_data as data;
pub use tradesphere_output as output;
pub use tradesphere_risk as risk;

pub use config::{PipelineConfig, files};
pub use dashboard::{DashboardData, DashboardLoader, LoaderStats};
pub use error::{PipelineError, Result};
pub use pipeline::{AnalyticsSummary, GenerateSummary, Pipeline, RunSummary, TransformSummary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
