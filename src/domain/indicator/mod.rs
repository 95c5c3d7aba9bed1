//! Technical indicators over closing-price lists.
//!
//! Each indicator reduces a price list (oldest first) to its latest value:
//! - `sma`: simple moving average
//! - `ema`: exponential moving average
//! - `rsi`: relative strength index
//!
//! `IndicatorType` names an indicator with its period, and `IndicatorSnapshot`
//! bundles the three readings the trading bot reports per pair.

pub mod ema;
pub mod rsi;
pub mod sma;

use serde::Serialize;
use std::fmt;

pub use ema::ema;
pub use rsi::{rsi, NEUTRAL_RSI};
pub use sma::sma;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
}

impl IndicatorType {
    /// Latest value of this indicator for `prices`.
    pub fn evaluate(&self, prices: &[f64]) -> Option<f64> {
        match *self {
            IndicatorType::Sma(period) => sma(prices, period),
            IndicatorType::Ema(period) => ema(prices, period),
            IndicatorType::Rsi(period) => Some(rsi(prices, period)),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// Where the RSI reading sits relative to the configured bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: f64,
    pub rsi_zone: RsiZone,
}

impl IndicatorSnapshot {
    pub fn compute(
        prices: &[f64],
        sma_period: usize,
        ema_period: usize,
        rsi_period: usize,
        oversold: f64,
        overbought: f64,
    ) -> Self {
        let rsi_value = IndicatorType::Rsi(rsi_period)
            .evaluate(prices)
            .unwrap_or(NEUTRAL_RSI);
        let rsi_zone = if rsi_value <= oversold {
            RsiZone::Oversold
        } else if rsi_value >= overbought {
            RsiZone::Overbought
        } else {
            RsiZone::Neutral
        };
        IndicatorSnapshot {
            sma: IndicatorType::Sma(sma_period).evaluate(prices),
            ema: IndicatorType::Ema(ema_period).evaluate(prices),
            rsi: rsi_value,
            rsi_zone,
        }
    }
}
