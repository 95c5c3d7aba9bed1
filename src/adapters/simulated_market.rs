//! Random-walk market data source.
//!
//! Prices are drawn from a per-pair range; history is a multiplicative walk
//! from the current price. Nothing here touches the network.

use chrono::{Duration, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::analysis::MarketConditions;
use crate::domain::error::FxlabError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::Trend;
use crate::ports::market_data_port::MarketDataPort;

const MAX_DAILY_MOVE: f64 = 0.02;
const MAX_WICK: f64 = 0.01;
const LEVEL_ANCHOR: f64 = 1.1;

pub struct SimulatedMarket {
    rng: StdRng,
}

impl SimulatedMarket {
    /// Deterministic source; the same seed yields the same prices.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }
}

/// Plausible trading range for the known majors.
pub fn price_range(pair: &str) -> Option<(f64, f64)> {
    match pair {
        "EUR/USD" => Some((1.05, 1.15)),
        "GBP/USD" => Some((1.20, 1.35)),
        "USD/JPY" => Some((100.0, 150.0)),
        "AUD/USD" => Some((0.65, 0.75)),
        "USD/CAD" => Some((1.20, 1.40)),
        _ => None,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl MarketDataPort for SimulatedMarket {
    fn current_price(&mut self, pair: &str) -> Result<f64, FxlabError> {
        Ok(match price_range(pair) {
            Some((lo, hi)) => round4(self.rng.gen_range(lo..hi)),
            None => 1.0,
        })
    }

    fn price_history(
        &mut self,
        pair: &str,
        days: usize,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, FxlabError> {
        let mut price = self.current_price(pair)?;
        let mut bars = Vec::with_capacity(days);

        for i in 0..days {
            let open = price;
            price *= 1.0 + self.rng.gen_range(-MAX_DAILY_MOVE..MAX_DAILY_MOVE);
            let high = open.max(price) * (1.0 + self.rng.gen_range(0.0..MAX_WICK));
            let low = open.min(price) * (1.0 - self.rng.gen_range(0.0..MAX_WICK));

            bars.push(PriceBar {
                timestamp: end - Duration::days((days - i) as i64),
                pair: pair.to_string(),
                open: round4(open),
                high: round4(high),
                low: round4(low),
                close: round4(price),
                volume: self.rng.gen_range(1_000..=10_000),
            });
        }

        Ok(bars)
    }

    fn market_conditions(&mut self, _pair: &str) -> Result<MarketConditions, FxlabError> {
        let trends = [Trend::Bullish, Trend::Bearish, Trend::Sideways];
        let weights = WeightedIndex::new([0.4, 0.4, 0.2]).map_err(|e| FxlabError::MarketData {
            reason: e.to_string(),
        })?;
        let trend = trends[weights.sample(&mut self.rng)];

        Ok(MarketConditions {
            trend,
            volatility: self.rng.gen_range(0.1..0.8),
            support_level: LEVEL_ANCHOR - self.rng.gen_range(0.005..0.02),
            resistance_level: LEVEL_ANCHOR + self.rng.gen_range(0.005..0.02),
        })
    }
}
