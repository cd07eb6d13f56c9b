//! Dashboard loading.
//!
//! [`DashboardLoader`] reads the pipeline's output tables through file-keyed
//! caches, so repeated renders only reload tables whose files changed. The
//! cleaned trades and counterparty summary are required; every other table
//! is optional and reported as absent when its file does not exist.

use crate::config::{PipelineConfig, files};
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tradesphere_analytics::{
    CounterpartySummary, DailyPnl, Dimension, ExposureRow, ExposureTable,
};
use tradesphere_data::{
    CacheStats, CleanTrade, DataError, RawTable, TableCache, clean_trades, read_records,
};
use tradesphere_output::{DashboardReport, ReportBuilder, TradeFilter};
use tradesphere_risk::VarRecord;

/// Tables behind one dashboard render.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Cleaned trades.
    pub trades: Arc<Vec<CleanTrade>>,
    /// Counterparty summary.
    pub summary: Arc<Vec<CounterpartySummary>>,
    /// Daily P&L series, if written.
    pub daily_pnl: Option<Arc<Vec<DailyPnl>>>,
    /// First VaR record, if written.
    pub var: Option<VarRecord>,
    /// Exposure by counterparty, if written.
    pub counterparty_exposure: Option<Arc<ExposureTable>>,
    /// Exposure by asset class, if written.
    pub asset_exposure: Option<Arc<ExposureTable>>,
}

/// Cache statistics per table family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Cleaned trades cache.
    pub trades: CacheStats,
    /// Summary cache.
    pub summary: CacheStats,
    /// Daily P&L cache.
    pub daily_pnl: CacheStats,
    /// VaR cache.
    pub var: CacheStats,
    /// Exposure caches, both dimensions.
    pub exposure: CacheStats,
}

impl LoaderStats {
    /// Reloads across every cache.
    pub const fn reloads(&self) -> u64 {
        self.trades.reloads
            + self.summary.reloads
            + self.daily_pnl.reloads
            + self.var.reloads
            + self.exposure.reloads
    }
}

/// Loads dashboard tables from a data directory with per-file caching.
#[derive(Debug)]
pub struct DashboardLoader {
    data_dir: PathBuf,
    trades: TableCache<Vec<CleanTrade>>,
    summary: TableCache<Vec<CounterpartySummary>>,
    daily_pnl: TableCache<Vec<DailyPnl>>,
    var: TableCache<Vec<VarRecord>>,
    exposure: TableCache<ExposureTable>,
}

impl DashboardLoader {
    /// Create a loader over `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            trades: TableCache::new(),
            summary: TableCache::new(),
            daily_pnl: TableCache::new(),
            var: TableCache::new(),
            exposure: TableCache::new(),
        }
    }

    /// Create a loader over the configured data directory.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.data_dir)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn required(&self, file: &str) -> Result<PathBuf> {
        let path = self.path(file);
        if path.is_file() {
            Ok(path)
        } else {
            Err(PipelineError::MissingInput {
                path: path.display().to_string(),
                stage: "transform",
            })
        }
    }

    fn optional(&self, file: &str) -> Option<PathBuf> {
        let path = self.path(file);
        if path.is_file() {
            Some(path)
        } else {
            debug!(path = %path.display(), "optional table absent");
            None
        }
    }

    /// Load every table, reusing cached copies of unchanged files.
    pub fn load(&self) -> Result<DashboardData> {
        let trades = self
            .trades
            .get_or_load(&self.required(files::PROCESSED_TRADES)?, load_trades)?;
        let summary = self
            .summary
            .get_or_load(&self.required(files::SUMMARY)?, |p| read_records(p))?;

        let daily_pnl = self
            .optional(files::PNL_DAILY)
            .map(|p| self.daily_pnl.get_or_load(&p, |p| read_records(p)))
            .transpose()?;
        let var = self
            .optional(files::VAR)
            .map(|p| self.var.get_or_load(&p, |p| read_records(p)))
            .transpose()?
            .and_then(|records| records.first().copied());
        let counterparty_exposure = self
            .optional(files::EXPOSURE_BY_COUNTERPARTY)
            .map(|p| {
                self.exposure
                    .get_or_load(&p, |p| load_exposure(p, Dimension::Counterparty))
            })
            .transpose()?;
        let asset_exposure = self
            .optional(files::EXPOSURE_BY_ASSET)
            .map(|p| {
                self.exposure
                    .get_or_load(&p, |p| load_exposure(p, Dimension::AssetClass))
            })
            .transpose()?;

        Ok(DashboardData {
            trades,
            summary,
            daily_pnl,
            var,
            counterparty_exposure,
            asset_exposure,
        })
    }

    /// Load the tables and build a report for `filter`.
    pub fn report(&self, filter: TradeFilter, max_rows: usize) -> Result<DashboardReport> {
        if let (Some(start), Some(end)) = (filter.start, filter.end)
            && start > end
        {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            }
            .into());
        }

        let data = self.load()?;
        let report = ReportBuilder::new()
            .filter(filter)
            .trades(data.trades.as_ref().clone())
            .summary(data.summary.as_ref().clone())
            .counterparty_exposure(data.counterparty_exposure.map(|t| t.as_ref().clone()))
            .asset_exposure(data.asset_exposure.map(|t| t.as_ref().clone()))
            .daily_pnl(data.daily_pnl.map(|d| d.as_ref().clone()))
            .var(data.var)
            .max_rows(max_rows)
            .build()?;
        Ok(report)
    }

    /// Drop every cached table.
    pub fn clear(&self) -> Result<()> {
        self.trades.clear()?;
        self.summary.clear()?;
        self.daily_pnl.clear()?;
        self.var.clear()?;
        self.exposure.clear()?;
        Ok(())
    }

    /// Cache statistics.
    pub fn stats(&self) -> Result<LoaderStats> {
        Ok(LoaderStats {
            trades: self.trades.stats()?,
            summary: self.summary.stats()?,
            daily_pnl: self.daily_pnl.stats()?,
            var: self.var.stats()?,
            exposure: self.exposure.stats()?,
        })
    }
}

fn load_trades(path: &Path) -> tradesphere_data::Result<Vec<CleanTrade>> {
    Ok(clean_trades(&RawTable::from_path(path)?)?.trades)
}

fn load_exposure(path: &Path, dimension: Dimension) -> tradesphere_data::Result<ExposureTable> {
    let rows: Vec<(String, f64)> = read_records(path)?;
    Ok(ExposureTable {
        dimension,
        rows: rows
            .into_iter()
            .map(|(key, exposure_mn)| ExposureRow { key, exposure_mn })
            .collect(),
    })
}
