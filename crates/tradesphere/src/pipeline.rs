//! Batch pipeline stages.
//!
//! - `generate` writes a synthetic raw trade table.
//! - `transform` cleans the raw table and writes the cleaned trades and the
//!   counterparty summary.
//! - `analytics` reads the cleaned trades back and writes the daily P&L, the
//!   VaR record, both exposure tables and the BI exports.
//!
//! Every stage reads its inputs from and writes its outputs to the configured
//! data directory, so stages can run in separate invocations.

use crate::config::{PipelineConfig, files};
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tradesphere_analytics::{Dimension, TradeFrame};
use tradesphere_data::{CleanOutcome, CoercionFailure, RawTable, clean_trades, generate_trades};
use tradesphere_output::{
    ExportFormat, Exporter, bi_export, tidy_daily_aggregate, tidy_export,
};
use tradesphere_risk::{HistoricalVarEstimator, VarEstimator, VarRecord};

/// Outcome of the `generate` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Raw table written.
    pub path: PathBuf,
    /// Trades generated.
    pub trades: usize,
}

/// Outcome of the `transform` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    /// Rows in the raw table.
    pub rows_read: usize,
    /// Rows that passed cleaning.
    pub kept: usize,
    /// Rows dropped, with the first failing cell of each.
    pub dropped: Vec<CoercionFailure>,
    /// Counterparties in the summary table.
    pub counterparties: usize,
}

/// Outcome of the `analytics` stage.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    /// Cleaned trades analysed.
    pub trades: usize,
    /// Dates in the daily P&L series.
    pub days: usize,
    /// VaR record written.
    pub var: VarRecord,
    /// Rows in the tidy export.
    pub tidy_rows: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Generate stage outcome.
    pub generate: GenerateSummary,
    /// Transform stage outcome.
    pub transform: TransformSummary,
    /// Analytics stage outcome.
    pub analytics: AnalyticsSummary,
}

/// Runs pipeline stages against one data directory.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Pipeline configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn write<E>(&self, table: &E, file: &str) -> Result<PathBuf>
    where
        E: Exporter + ?Sized,
    {
        let path = self.config.path(file);
        table.export_to_file(&path, ExportFormat::Csv)?;
        info!(path = %path.display(), "wrote table");
        Ok(path)
    }

    fn require(path: &Path, stage: &'static str) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(PipelineError::MissingInput {
                path: path.display().to_string(),
                stage,
            })
        }
    }

    fn load_clean(path: &Path) -> Result<CleanOutcome> {
        let table = RawTable::from_path(path)?;
        Ok(clean_trades(&table)?)
    }

    /// Generate synthetic trades and write the raw table.
    pub fn generate(&self) -> Result<GenerateSummary> {
        std::fs::create_dir_all(&self.config.data_dir)?;
        let trades = generate_trades(self.config.generator.clone())?;
        let path = self.write(trades.as_slice(), &self.config.raw_file)?;

        info!(trades = trades.len(), "generate stage complete");
        Ok(GenerateSummary {
            path,
            trades: trades.len(),
        })
    }

    /// Clean the raw table; write cleaned trades and the counterparty summary.
    pub fn transform(&self) -> Result<TransformSummary> {
        let raw = self.config.raw_path();
        Self::require(&raw, "generate")?;
        std::fs::create_dir_all(&self.config.data_dir)?;

        let outcome = Self::load_clean(&raw)?;
        if !outcome.dropped.is_empty() {
            warn!(dropped = outcome.dropped.len(), "rows failed coercion");
        }

        let summary = TradeFrame::new(&outcome.trades)?.counterparty_summary()?;
        self.write(outcome.trades.as_slice(), files::PROCESSED_TRADES)?;
        self.write(summary.as_slice(), files::SUMMARY)?;

        info!(
            kept = outcome.trades.len(),
            counterparties = summary.len(),
            "transform stage complete"
        );
        Ok(TransformSummary {
            rows_read: outcome.rows_read(),
            kept: outcome.trades.len(),
            dropped: outcome.dropped,
            counterparties: summary.len(),
        })
    }

    /// Compute daily P&L, VaR, exposures and the BI exports from the cleaned
    /// trades.
    pub fn analytics(&self) -> Result<AnalyticsSummary> {
        let processed = self.config.path(files::PROCESSED_TRADES);
        Self::require(&processed, "transform")?;

        let trades = Self::load_clean(&processed)?.trades;
        let frame = TradeFrame::new(&trades)?;

        let daily = frame.daily_pnl()?;
        let series: Vec<f64> = daily.iter().map(|d| d.pnl_total).collect();
        let var = HistoricalVarEstimator::new(self.config.var.clone())?.estimate(&series);

        let by_counterparty = frame.exposure_by(Dimension::Counterparty)?;
        let by_asset = frame.exposure_by(Dimension::AssetClass)?;

        let wide = bi_export(&trades);
        let tidy = tidy_export(&wide);
        let tidy_daily = tidy_daily_aggregate(&tidy);

        self.write(daily.as_slice(), files::PNL_DAILY)?;
        self.write(&var, files::VAR)?;
        self.write(&by_counterparty, files::EXPOSURE_BY_COUNTERPARTY)?;
        self.write(&by_asset, files::EXPOSURE_BY_ASSET)?;
        self.write(wide.as_slice(), files::BI_EXPORT)?;
        self.write(tidy.as_slice(), files::TIDY)?;
        self.write(tidy_daily.as_slice(), files::TIDY_DAILY)?;

        info!(
            trades = trades.len(),
            days = daily.len(),
            var = ?var.var,
            "analytics stage complete"
        );
        Ok(AnalyticsSummary {
            trades: trades.len(),
            days: daily.len(),
            var,
            tidy_rows: tidy.len(),
        })
    }

    /// Run `generate`, `transform` and `analytics` in order.
    pub fn run_all(&self) -> Result<RunSummary> {
        Ok(RunSummary {
            generate: self.generate()?,
            transform: self.transform()?,
            analytics: self.analytics()?,
        })
    }
}
