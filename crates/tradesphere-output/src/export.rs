//! Export functionality for TradeSphere tables.
//!
//! This module provides CSV and JSON export for every table the pipeline
//! writes: raw and cleaned trades, summaries, the daily P&L series, the VaR record,
//! exposure tables and the BI exports.

use crate::bi::{BiRow, TidyRow};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tradesphere_analytics::{CounterpartySummary, DailyPnl, ExposureTable};
use tradesphere_data::{CleanTrade, TradeRecord};
use tradesphere_risk::VarRecord;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Parse a format name (`csv`, `json`, `pretty-json`).
    pub fn parse(name: &str) -> Result<Self, ExportError> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// A flat row type with a fixed column set.
///
/// The column list is written as the CSV header even when a table is empty,
/// and must match the serialized field order.
pub trait Record: Serialize {
    /// Column names in serialization order.
    const COLUMNS: &'static [&'static str];
}

impl Record for TradeRecord {
    const COLUMNS: &'static [&'static str] = &[
        "trade_id",
        "counterparty",
        "asset_class",
        "currency",
        "trade_type",
        "trade_date",
        "notional",
        "pnl",
    ];
}

impl Record for CleanTrade {
    const COLUMNS: &'static [&'static str] = &[
        "trade_id",
        "counterparty",
        "asset_class",
        "currency",
        "trade_type",
        "trade_date",
        "notional",
        "pnl",
        "notional_mn",
        "year",
        "month",
    ];
}

impl Record for CounterpartySummary {
    const COLUMNS: &'static [&'static str] = &[
        "counterparty",
        "total_exposure_mn",
        "trades",
        "pnl_total",
        "pnl_avg",
    ];
}

impl Record for DailyPnl {
    const COLUMNS: &'static [&'static str] = &["trade_date", "pnl_total"];
}

impl Record for VarRecord {
    const COLUMNS: &'static [&'static str] = &["alpha", "lookback_days", "VaR"];
}

impl Record for BiRow {
    const COLUMNS: &'static [&'static str] = &[
        "trade_date",
        "yyyymm",
        "counterparty",
        "asset_class",
        "currency",
        "trade_type",
        "notional",
        "notional_mn",
        "pnl",
    ];
}

impl Record for TidyRow {
    const COLUMNS: &'static [&'static str] = &[
        "trade_date",
        "yyyymm",
        "counterparty",
        "asset_class",
        "currency",
        "trade_type",
        "metric",
        "value",
    ];
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_string<F>(header: &[&str], write_rows: F) -> Result<String, ExportError>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> Result<(), ExportError>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(header)?;
    write_rows(&mut wtr)?;
    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(data)?)
}

impl<T: Record> Exporter for [T] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(T::COLUMNS, |wtr| {
                for record in self {
                    wtr.serialize(record)?;
                }
                Ok(())
            }),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for VarRecord {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => std::slice::from_ref(self).export_to_string(format),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for ExposureTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(&[self.dimension.column(), "exposure_mn"], |wtr| {
                for row in &self.rows {
                    wtr.write_record([row.key.as_str(), &row.exposure_mn.to_string()])?;
                }
                Ok(())
            }),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
