//! Trend and trade signal classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::FxlabError;

/// Bar-over-bar move (as a fraction) beyond which a bar counts as trending.
pub const TREND_THRESHOLD: f64 = 0.005;

/// Live strategy only trades when volatility is below this.
pub const ENTRY_MAX_VOLATILITY: f64 = 0.5;

/// Signal validation rejects trades at or above this volatility.
pub const VALIDATION_MAX_VOLATILITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Direction of an open trade. Only BUY and SELL signals open trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Signal {
    pub fn side(self) -> Option<Side> {
        match self {
            Signal::Buy => Some(Side::Buy),
            Signal::Sell => Some(Side::Sell),
            Signal::Hold => None,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Bullish => "BULLISH",
            Trend::Bearish => "BEARISH",
            Trend::Sideways => "SIDEWAYS",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

impl FromStr for Signal {
    type Err = FxlabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Signal::Buy),
            "SELL" => Ok(Signal::Sell),
            "HOLD" => Ok(Signal::Hold),
            other => Err(FxlabError::InvalidSignal(other.to_string())),
        }
    }
}

/// Classify a single bar's move into a trend and signal.
///
/// Returns `(trend, signal, volatility)` where volatility is `|change| * 10`.
pub fn classify_change(open: f64, close: f64) -> (Trend, Signal, f64) {
    let change = if open == 0.0 {
        0.0
    } else {
        (close - open) / open
    };
    let volatility = change.abs() * 10.0;

    if change > TREND_THRESHOLD {
        (Trend::Bullish, Signal::Buy, volatility)
    } else if change < -TREND_THRESHOLD {
        (Trend::Bearish, Signal::Sell, volatility)
    } else {
        (Trend::Sideways, Signal::Hold, volatility)
    }
}

/// Live entry rule: trade with the trend only in calm markets.
pub fn live_signal(trend: Trend, volatility: f64) -> Signal {
    match trend {
        Trend::Bullish if volatility < ENTRY_MAX_VOLATILITY => Signal::Buy,
        Trend::Bearish if volatility < ENTRY_MAX_VOLATILITY => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// Check whether `signal` agrees with the observed trend and volatility.
pub fn validate_trade_signal(signal: Signal, trend: Trend, volatility: f64) -> bool {
    match signal {
        Signal::Buy => trend == Trend::Bullish && volatility < VALIDATION_MAX_VOLATILITY,
        Signal::Sell => trend == Trend::Bearish && volatility < VALIDATION_MAX_VOLATILITY,
        Signal::Hold => true,
    }
}
