//! Demonstration of the export functionality in tradesphere-output.

use chrono::NaiveDate;
use tradesphere_analytics::{Dimension, TradeFrame};
use tradesphere_data::{CleanTrade, GeneratorConfig, generate_trades};
use tradesphere_output::{
    ExportFormat, Exporter, ReportBuilder, TradeFilter, bi_export, tidy_daily_aggregate,
    tidy_export,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== TradeSphere Export Demo ===\n");

    let config = GeneratorConfig {
        trades: 12,
        window_business_days: 4,
        end_date: NaiveDate::from_ymd_opt(2024, 6, 28),
        ..Default::default()
    };
    let trades: Vec<CleanTrade> = generate_trades(config)?
        .into_iter()
        .map(CleanTrade::from)
        .collect();

    // 1. Wide BI export
    println!("1. BI Export (CSV)\n");
    let wide = bi_export(&trades);
    println!("{}", wide.export_to_string(ExportFormat::Csv)?);

    // 2. Tidy export, aggregated per day
    println!("2. Tidy Daily Aggregate (first rows, JSON)\n");
    let agg = tidy_daily_aggregate(&tidy_export(&wide));
    println!("{}\n", agg[..agg.len().min(3)].export_to_string(ExportFormat::PrettyJson)?);

    // 3. Exposure table
    println!("3. Exposure by Asset Class (CSV)\n");
    let frame = TradeFrame::new(&trades)?;
    let by_asset = frame.exposure_by(Dimension::AssetClass)?;
    println!("{}", by_asset.export_to_string(ExportFormat::Csv)?);

    // 4. Filtered dashboard
    println!("4. Dashboard for Bank A\n");
    let report = ReportBuilder::new()
        .trades(trades)
        .summary(frame.counterparty_summary()?)
        .asset_exposure(Some(by_asset))
        .daily_pnl(Some(frame.daily_pnl()?))
        .filter(TradeFilter::new().counterparties(["Bank A"]))
        .max_rows(5)
        .build()?;
    println!("{}", report.to_text());

    Ok(())
}
