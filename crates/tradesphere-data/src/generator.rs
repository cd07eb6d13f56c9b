//! Synthetic trade generation.
//!
//! Produces a reproducible set of trades spread over a trailing window of
//! business days. P&L is drawn from a zero-mean normal distribution whose
//! standard deviation scales with the trade's notional.

use crate::error::{DataError, Result};
use crate::trade::{ASSET_CLASSES, COUNTERPARTIES, CURRENCIES, TRADE_TYPES, TradeRecord};
use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Draw weights for [`ASSET_CLASSES`].
pub const ASSET_CLASS_WEIGHTS: [f64; 4] = [0.45, 0.25, 0.20, 0.10];

/// Draw weights for [`TRADE_TYPES`].
pub const TRADE_TYPE_WEIGHTS: [f64; 2] = [0.55, 0.45];

/// Configuration for the trade generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of trades to generate (default: 1200)
    pub trades: usize,
    /// Business days before `end_date` covered by the window (default: 120)
    pub window_business_days: usize,
    /// Last calendar date of the window (default: today)
    pub end_date: Option<NaiveDate>,
    /// RNG seed (default: 11)
    pub seed: u64,
    /// Notional draw bounds, lower inclusive, upper exclusive
    pub notional_range: (f64, f64),
    /// P&L standard deviation as a fraction of notional (default: 0.02)
    pub pnl_vol: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            trades: 1200,
            window_business_days: 120,
            end_date: None,
            seed: 11,
            notional_range: (2e5, 4e6),
            pnl_vol: 0.02,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<()> {
        let (lo, hi) = self.notional_range;
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
            return Err(DataError::InvalidConfig(format!(
                "notional range must satisfy 0 < low < high, got ({lo}, {hi})"
            )));
        }
        if !self.pnl_vol.is_finite() || self.pnl_vol < 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "pnl volatility must be non-negative, got {}",
                self.pnl_vol
            )));
        }
        Ok(())
    }
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business days in the window ending on or before `end`, ascending.
///
/// The window holds `window + 1` dates: the last business day on or before
/// `end` plus the `window` business days preceding it.
pub fn business_days(end: NaiveDate, window: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(window + 1);
    let mut current = end;

    while dates.len() < window + 1 {
        if is_business_day(current) {
            dates.push(current);
        }
        match current.checked_sub_days(Days::new(1)) {
            Some(prev) => current = prev,
            None => break,
        }
    }

    dates.reverse();
    dates
}

/// Seeded generator of synthetic trades.
#[derive(Debug)]
pub struct TradeGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    dates: Vec<NaiveDate>,
    asset_classes: WeightedIndex<f64>,
    trade_types: WeightedIndex<f64>,
}

impl TradeGenerator {
    /// Create a generator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfig`] for an empty notional range or a
    /// negative P&L volatility.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        let end = config
            .end_date
            .unwrap_or_else(|| Local::now().date_naive());
        let dates = business_days(end, config.window_business_days);
        if dates.is_empty() {
            return Err(DataError::InvalidConfig(format!(
                "no business days on or before {end}"
            )));
        }

        let asset_classes = WeightedIndex::new(ASSET_CLASS_WEIGHTS)
            .map_err(|e| DataError::InvalidConfig(e.to_string()))?;
        let trade_types = WeightedIndex::new(TRADE_TYPE_WEIGHTS)
            .map_err(|e| DataError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            dates,
            asset_classes,
            trade_types,
        })
    }

    /// Dates trades are drawn from.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Draw a single trade.
    pub fn next_trade(&mut self) -> Result<TradeRecord> {
        let (lo, hi) = self.config.notional_range;

        let trade_date = self.dates[self.rng.gen_range(0..self.dates.len())];
        let counterparty = COUNTERPARTIES[self.rng.gen_range(0..COUNTERPARTIES.len())];
        let asset_class = ASSET_CLASSES[self.asset_classes.sample(&mut self.rng)];
        let currency = CURRENCIES[self.rng.gen_range(0..CURRENCIES.len())];
        let trade_type = TRADE_TYPES[self.trade_types.sample(&mut self.rng)];

        let notional = self.rng.gen_range(lo..hi);
        let pnl = Normal::new(0.0, notional * self.config.pnl_vol)
            .map_err(|e| DataError::InvalidConfig(e.to_string()))?
            .sample(&mut self.rng);

        Ok(TradeRecord {
            trade_id: self.rng.gen_range(100_000..999_999),
            counterparty: counterparty.to_string(),
            asset_class: asset_class.to_string(),
            currency: currency.to_string(),
            trade_type: trade_type.to_string(),
            trade_date,
            notional,
            pnl,
        })
    }

    /// Draw the configured number of trades.
    pub fn generate(&mut self) -> Result<Vec<TradeRecord>> {
        let trades = (0..self.config.trades)
            .map(|_| self.next_trade())
            .collect::<Result<Vec<_>>>()?;

        info!(
            trades = trades.len(),
            first_date = %self.dates[0],
            last_date = %self.dates[self.dates.len() - 1],
            seed = self.config.seed,
            "generated synthetic trades"
        );

        Ok(trades)
    }
}

/// Generate trades with the given configuration.
pub fn generate_trades(config: GeneratorConfig) -> Result<Vec<TradeRecord>> {
    TradeGenerator::new(config)?.generate()
}
