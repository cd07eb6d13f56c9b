//! Dashboard report for TradeSphere.
//!
//! A [`DashboardReport`] is assembled from the pipeline's output tables and a
//! [`TradeFilter`]. The filter drives the KPI block, the daily P&L window and
//! the trade listing; the counterparty summary and exposure tables are shown
//! as stored. Tables that were not available are rendered as a note.

use crate::filter::TradeFilter;
use crate::format::{PLACEHOLDER, group_thousands};
use crate::kpi::Kpis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;
use tracing::debug;
use tradesphere_analytics::{AnalyticsError, CounterpartySummary, DailyPnl, ExposureTable};
use tradesphere_data::CleanTrade;
use tradesphere_risk::VarRecord;

/// Rows of the counterparty exposure table that are shown.
pub const TOP_COUNTERPARTIES: usize = 15;

/// Default cap on rows in text output.
pub const DEFAULT_MAX_ROWS: usize = 20;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// KPI aggregation error.
    #[error("Aggregation error: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// Text rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Plain aligned columns for a terminal.
    Ascii,
    /// GitHub-flavoured markdown tables.
    Markdown,
}

/// A rendered dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Filter the report was built with.
    pub filter: TradeFilter,
    /// Headline figures over the filtered trades.
    pub kpis: Kpis,
    /// Stored counterparty summary.
    pub summary: Vec<CounterpartySummary>,
    /// Largest counterparty exposures, if stored.
    pub counterparty_exposure: Option<ExposureTable>,
    /// Exposure by asset class, if stored.
    pub asset_exposure: Option<ExposureTable>,
    /// Daily P&L inside the date range, if stored.
    pub daily_pnl: Option<Vec<DailyPnl>>,
    /// Filtered trades, latest first.
    pub trades: Vec<CleanTrade>,
    /// Row cap for text output.
    #[serde(skip, default = "default_max_rows")]
    pub max_rows: usize,
}

const fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

impl DashboardReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as aligned plain text.
    pub fn to_text(&self) -> String {
        self.render(TextStyle::Ascii)
    }

    /// Render as markdown.
    pub fn to_markdown(&self) -> String {
        self.render(TextStyle::Markdown)
    }

    /// Render in the given style.
    pub fn render(&self, style: TextStyle) -> String {
        let mut out = String::new();
        let heading = |out: &mut String, title: &str| match style {
            TextStyle::Ascii => {
                let _ = writeln!(out, "\n{title}\n{}", "=".repeat(title.chars().count()));
            }
            TextStyle::Markdown => {
                let _ = writeln!(out, "\n## {title}\n");
            }
        };

        match style {
            TextStyle::Ascii => {
                let _ = writeln!(out, "TradeSphere Risk & Analytics");
            }
            TextStyle::Markdown => {
                let _ = writeln!(out, "# TradeSphere Risk & Analytics");
            }
        }
        let _ = writeln!(
            out,
            "{}\nGenerated {}",
            describe_filter(&self.filter),
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        heading(&mut out, "Key figures");
        let kpi_rows: Vec<Vec<String>> = self
            .kpis
            .rows()
            .into_iter()
            .map(|(label, value)| vec![label, value])
            .collect();
        out.push_str(&Table::new(&["metric", "value"], &[false, true], kpi_rows).render(style));

        heading(&mut out, "Counterparty summary");
        if self.summary.is_empty() {
            out.push_str("No counterparty summary available.\n");
        } else {
            let rows = self
                .summary
                .iter()
                .map(|s| {
                    vec![
                        s.counterparty.clone(),
                        group_thousands(s.total_exposure_mn, 2),
                        group_thousands(s.trades as f64, 0),
                        group_thousands(s.pnl_total, 0),
                        group_thousands(s.pnl_avg, 0),
                    ]
                })
                .collect();
            out.push_str(
                &Table::new(
                    &["counterparty", "total_exposure_mn", "trades", "pnl_total", "pnl_avg"],
                    &[false, true, true, true, true],
                    rows,
                )
                .render(style),
            );
        }

        heading(&mut out, "Top counterparties (mn)");
        out.push_str(&exposure_section(self.counterparty_exposure.as_ref(), style));

        heading(&mut out, "Exposure by asset class (mn)");
        out.push_str(&exposure_section(self.asset_exposure.as_ref(), style));

        heading(&mut out, "Daily portfolio P&L");
        match &self.daily_pnl {
            None => out.push_str("Daily P&L not available.\n"),
            Some(daily) if daily.is_empty() => out.push_str("No daily P&L in the selected range.\n"),
            Some(daily) => {
                let skip = daily.len().saturating_sub(self.max_rows);
                let rows = daily[skip..]
                    .iter()
                    .map(|d| vec![d.trade_date.to_string(), group_thousands(d.pnl_total, 2)])
                    .collect();
                out.push_str(
                    &Table::new(&["trade_date", "pnl_total"], &[false, true], rows).render(style),
                );
                if skip > 0 {
                    let _ = writeln!(out, "(showing last {} of {} days)", daily.len() - skip, daily.len());
                }
            }
        }

        heading(&mut out, "Filtered trades");
        if self.trades.is_empty() {
            out.push_str("No trades match the current filters.\n");
        } else {
            let shown = self.trades.len().min(self.max_rows);
            let rows = self.trades[..shown]
                .iter()
                .map(|t| {
                    vec![
                        t.trade_date.to_string(),
                        t.trade_id.to_string(),
                        t.counterparty.clone(),
                        t.asset_class.clone(),
                        t.currency.clone(),
                        t.trade_type.clone(),
                        group_thousands(t.notional_mn, 2),
                        group_thousands(t.pnl, 0),
                    ]
                })
                .collect();
            out.push_str(
                &Table::new(
                    &[
                        "trade_date",
                        "trade_id",
                        "counterparty",
                        "asset_class",
                        "currency",
                        "trade_type",
                        "notional_mn",
                        "pnl",
                    ],
                    &[false, true, false, false, false, false, true, true],
                    rows,
                )
                .render(style),
            );
            if shown < self.trades.len() {
                let _ = writeln!(out, "... {} more rows", self.trades.len() - shown);
            }
        }

        out
    }
}

fn describe_filter(filter: &TradeFilter) -> String {
    let bound = |d: Option<chrono::NaiveDate>| d.map_or_else(|| PLACEHOLDER.to_string(), |d| d.to_string());
    let list = |items: &[String]| {
        if items.is_empty() {
            "all".to_string()
        } else {
            items.join(", ")
        }
    };
    format!(
        "Dates: {} to {} | Counterparties: {} | Asset classes: {}",
        bound(filter.start),
        bound(filter.end),
        list(&filter.counterparties),
        list(&filter.asset_classes)
    )
}

fn exposure_section(table: Option<&ExposureTable>, style: TextStyle) -> String {
    match table {
        None => "Exposure table not available.\n".to_string(),
        Some(table) if table.rows.is_empty() => "No exposure rows.\n".to_string(),
        Some(table) => {
            let rows = table
                .rows
                .iter()
                .map(|r| vec![r.key.clone(), group_thousands(r.exposure_mn, 2)])
                .collect();
            Table::new(&[table.dimension.column(), "exposure_mn"], &[false, true], rows)
                .render(style)
        }
    }
}

/// Column-aligned text table.
#[derive(Debug)]
struct Table {
    headers: Vec<String>,
    right_align: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str], right_align: &[bool], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            right_align: right_align.to_vec(),
            rows,
        }
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn line(&self, cells: &[String], widths: &[usize], sep: &str) -> String {
        cells
            .iter()
            .zip(widths)
            .zip(&self.right_align)
            .map(|((cell, &width), &right)| {
                let pad = " ".repeat(width.saturating_sub(cell.chars().count()));
                if right {
                    format!("{pad}{cell}")
                } else {
                    format!("{cell}{pad}")
                }
            })
            .collect::<Vec<_>>()
            .join(sep)
    }

    fn render(&self, style: TextStyle) -> String {
        let widths = self.widths();
        let mut out = String::new();
        match style {
            TextStyle::Ascii => {
                let _ = writeln!(out, "{}", self.line(&self.headers, &widths, "  "));
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                let _ = writeln!(out, "{}", rule.join("  "));
                for row in &self.rows {
                    let _ = writeln!(out, "{}", self.line(row, &widths, "  "));
                }
            }
            TextStyle::Markdown => {
                let _ = writeln!(out, "| {} |", self.line(&self.headers, &widths, " | "));
                let rule: Vec<String> = widths
                    .iter()
                    .zip(&self.right_align)
                    .map(|(w, right)| {
                        let dashes = "-".repeat((*w).max(3) - 1);
                        if *right { format!("{dashes}:") } else { format!("-{dashes}") }
                    })
                    .collect();
                let _ = writeln!(out, "| {} |", rule.join(" | "));
                for row in &self.rows {
                    let _ = writeln!(out, "| {} |", self.line(row, &widths, " | "));
                }
            }
        }
        out
    }
}

/// Builder for creating dashboard reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    filter: TradeFilter,
    trades: Vec<CleanTrade>,
    summary: Vec<CounterpartySummary>,
    counterparty_exposure: Option<ExposureTable>,
    asset_exposure: Option<ExposureTable>,
    daily_pnl: Option<Vec<DailyPnl>>,
    var: Option<VarRecord>,
    max_rows: Option<usize>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter.
    pub fn filter(mut self, filter: TradeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the full set of cleaned trades; the filter is applied on build.
    pub fn trades(mut self, trades: Vec<CleanTrade>) -> Self {
        self.trades = trades;
        self
    }

    /// Set the stored counterparty summary.
    pub fn summary(mut self, summary: Vec<CounterpartySummary>) -> Self {
        self.summary = summary;
        self
    }

    /// Set the stored counterparty exposure table.
    pub fn counterparty_exposure(mut self, table: Option<ExposureTable>) -> Self {
        self.counterparty_exposure = table;
        self
    }

    /// Set the stored asset-class exposure table.
    pub fn asset_exposure(mut self, table: Option<ExposureTable>) -> Self {
        self.asset_exposure = table;
        self
    }

    /// Set the stored daily P&L series.
    pub fn daily_pnl(mut self, daily: Option<Vec<DailyPnl>>) -> Self {
        self.daily_pnl = daily;
        self
    }

    /// Set the stored VaR record.
    pub const fn var(mut self, var: Option<VarRecord>) -> Self {
        self.var = var;
        self
    }

    /// Cap rows in text output.
    pub const fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<DashboardReport, ReportError> {
        let mut trades = self.filter.apply(&self.trades);
        trades.sort_by(|a, b| b.trade_date.cmp(&a.trade_date));
        debug!(
            total = self.trades.len(),
            kept = trades.len(),
            "applied dashboard filter"
        );

        let kpis = Kpis::compute(
            &trades,
            self.daily_pnl.as_deref().unwrap_or_default(),
            self.var.as_ref(),
        )?;

        let daily_pnl = self.daily_pnl.map(|daily| {
            daily
                .into_iter()
                .filter(|d| self.filter.contains_date(d.trade_date))
                .collect::<Vec<_>>()
        });

        let counterparty_exposure = self.counterparty_exposure.map(|mut table| {
            table.rows.truncate(TOP_COUNTERPARTIES);
            table
        });

        Ok(DashboardReport {
            generated_at: Utc::now(),
            filter: self.filter,
            kpis,
            summary: self.summary,
            counterparty_exposure,
            asset_exposure: self.asset_exposure,
            daily_pnl,
            trades,
            max_rows: self.max_rows.unwrap_or(DEFAULT_MAX_ROWS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tradesphere_analytics::{Dimension, ExposureRow};
    use tradesphere_data::TradeRecord;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn trade(id: i64, cp: &str, d: u32, pnl: f64) -> CleanTrade {
        CleanTrade::from(TradeRecord {
            trade_id: id,
            counterparty: cp.to_string(),
            asset_class: "Equity".to_string(),
            currency: "USD".to_string(),
            trade_type: "Buy".to_string(),
            trade_date: date(d),
            notional: 2_000_000.0,
            pnl,
        })
    }

    fn exposure(n: usize) -> ExposureTable {
        ExposureTable {
            dimension: Dimension::Counterparty,
            rows: (0..n)
                .map(|i| ExposureRow {
                    key: format!("Bank {i:02}"),
                    exposure_mn: (n - i) as f64,
                })
                .collect(),
        }
    }

    fn builder() -> ReportBuilder {
        ReportBuilder::new().trades(vec![
            trade(1, "Bank A", 4, 100.0),
            trade(2, "Bank B", 6, -40.0),
            trade(3, "Bank A", 5, 10.0),
        ])
    }

    #[test]
    fn test_trades_sorted_latest_first() {
        let report = builder().build().unwrap();
        let days: Vec<_> = report.trades.iter().map(|t| t.trade_date).collect();
        assert_eq!(days, vec![date(6), date(5), date(4)]);
        assert_eq!(report.kpis.trades, 3);
    }

    #[test]
    fn test_filter_drives_kpis_and_daily_window() {
        let daily = (1..=10)
            .map(|d| DailyPnl {
                trade_date: date(d),
                pnl_total: 1.0,
            })
            .collect();
        let report = builder()
            .filter(TradeFilter::new().start(date(5)).end(date(9)))
            .daily_pnl(Some(daily))
            .build()
            .unwrap();

        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.daily_pnl.as_ref().unwrap().len(), 5);
        assert!((report.kpis.pnl_total - -30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pnl_delta_ignores_date_range() {
        let daily: Vec<DailyPnl> = (1..=20)
            .map(|d| DailyPnl {
                trade_date: date(d),
                pnl_total: f64::from(d),
            })
            .collect();
        let report = builder()
            .filter(TradeFilter::new().start(date(10)).end(date(16)))
            .daily_pnl(Some(daily))
            .build()
            .unwrap();

        assert_eq!(report.daily_pnl.as_ref().unwrap().len(), 7);
        assert_eq!(report.kpis.pnl_delta, Some(49.0));
    }

    #[test]
    fn test_counterparty_exposure_limited_to_top() {
        let report = builder()
            .counterparty_exposure(Some(exposure(20)))
            .asset_exposure(Some(ExposureTable {
                dimension: Dimension::AssetClass,
                rows: vec![],
            }))
            .build()
            .unwrap();

        assert_eq!(report.counterparty_exposure.unwrap().rows.len(), TOP_COUNTERPARTIES);
        assert!(report.asset_exposure.unwrap().rows.is_empty());
    }

    #[test]
    fn test_empty_selection_renders_without_error() {
        let report = builder()
            .filter(TradeFilter::new().counterparties(["Bank Z"]))
            .build()
            .unwrap();

        assert!(report.trades.is_empty());
        let text = report.to_text();
        assert!(text.contains("No trades match the current filters."));
        assert!(text.contains("Daily P&L not available."));
        assert!(text.contains("Exposure table not available."));
        assert!(text.contains("0.00 mn"));
        assert!(text.contains(PLACEHOLDER));
    }

    #[test]
    fn test_text_row_cap() {
        let trades = (1..=9).map(|d| trade(i64::from(d), "Bank A", d, 1.0)).collect();
        let report = ReportBuilder::new().trades(trades).max_rows(4).build().unwrap();
        assert!(report.to_text().contains("... 5 more rows"));
    }

    #[test]
    fn test_markdown_tables() {
        let report = builder().counterparty_exposure(Some(exposure(2))).build().unwrap();
        let md = report.to_markdown();

        assert!(md.starts_with("# TradeSphere Risk & Analytics"));
        assert!(md.contains("## Top counterparties (mn)"));
        assert!(md.contains("| counterparty | exposure_mn |"));
        assert!(md.contains("| Bank 00      |        2.00 |"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = builder().build().unwrap();
        let json = report.to_json().unwrap();
        let back: DashboardReport = serde_json::from_str(&json).unwrap();

        assert_eq!(back.trades.len(), 3);
        assert_eq!(back.kpis, report.kpis);
        assert_eq!(back.max_rows, DEFAULT_MAX_ROWS);
    }
}
