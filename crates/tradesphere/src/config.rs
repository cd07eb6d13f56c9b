//! Pipeline configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tradesphere_data::GeneratorConfig;
use tradesphere_risk::{HistoricalVarConfig, HistoricalVarEstimator};

/// File names of the tables written to the data directory.
pub mod files {
    /// Raw trades written by the generator.
    pub const RAW_TRADES: &str = "trades.csv";
    /// Cleaned trades with derived fields.
    pub const PROCESSED_TRADES: &str = "processed_trades.csv";
    /// Per-counterparty summary.
    pub const SUMMARY: &str = "summary_metrics.csv";
    /// Portfolio P&L per trade date.
    pub const PNL_DAILY: &str = "pnl_daily.csv";
    /// Historical VaR record.
    pub const VAR: &str = "var_metrics.csv";
    /// Exposure by counterparty.
    pub const EXPOSURE_BY_COUNTERPARTY: &str = "exposure_by_counterparty.csv";
    /// Exposure by asset class.
    pub const EXPOSURE_BY_ASSET: &str = "exposure_by_asset.csv";
    /// Wide BI export.
    pub const BI_EXPORT: &str = "bi_export.csv";
    /// Tidy (long) export.
    pub const TIDY: &str = "tableau_long.csv";
    /// Tidy export aggregated per date.
    pub const TIDY_DAILY: &str = "tableau_long_daily_agg.csv";
}

/// Configuration for a pipeline run.
///
/// Every field has a default, so a JSON file only needs the values it
/// changes:
///
/// ```json
/// { "data_dir": "out", "var": { "alpha": 0.99 }, "generator": { "seed": 7 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding every input and output table (default: `data`)
    pub data_dir: PathBuf,
    /// File name of the raw trade table inside `data_dir` (default: `trades.csv`)
    pub raw_file: String,
    /// Historical VaR settings
    pub var: HistoricalVarConfig,
    /// Synthetic trade generator settings
    pub generator: GeneratorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            raw_file: files::RAW_TRADES.to_string(),
            var: HistoricalVarConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<()> {
        HistoricalVarEstimator::new(self.var.clone())?;
        Ok(())
    }

    /// Path of `file` inside the data directory.
    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Path of the raw trade table.
    pub fn raw_path(&self) -> PathBuf {
        self.path(&self.raw_file)
    }
}
