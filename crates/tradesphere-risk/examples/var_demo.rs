//! Historical VaR over a synthetic daily P&L series.

use tradesphere_risk::{HistoricalVarConfig, HistoricalVarEstimator, VarEstimator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== TradeSphere Historical VaR Demo ===\n");

    // A lopsided series: steady small gains with occasional large losses.
    let pnl: Vec<f64> = (0..120)
        .map(|i| if i % 17 == 0 { -250_000.0 } else { 15_000.0 + (i % 7) as f64 * 1_000.0 })
        .collect();

    for (alpha, lookback) in [(0.95, 60), (0.99, 60), (0.95, 120), (0.95, 3)] {
        let estimator = HistoricalVarEstimator::new(HistoricalVarConfig {
            alpha,
            lookback,
            ..Default::default()
        })?;
        let record = estimator.estimate(&pnl);

        match record.var {
            Some(var) => println!(
                "alpha {:.2}, lookback {:>3}: VaR = {:>12.2} ({} observations)",
                alpha, lookback, var, record.observations
            ),
            None => println!(
                "alpha {:.2}, lookback {:>3}: VaR undefined ({} observations)",
                alpha, lookback, record.observations
            ),
        }
    }

    Ok(())
}
