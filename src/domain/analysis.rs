//! Market analysis records produced by the trading bot and backtester.

use serde::Serialize;

use super::indicator::IndicatorSnapshot;
use super::ohlcv::PriceBar;
use super::signal::{classify_change, live_signal, Signal, Trend};

/// Observed state of a market as reported by a data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketConditions {
    pub trend: Trend,
    pub volatility: f64,
    pub support_level: f64,
    pub resistance_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAnalysis {
    pub pair: String,
    pub trend: Trend,
    pub volatility: f64,
    pub signal: Signal,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorSnapshot>,
}

impl MarketAnalysis {
    /// Analysis for a single historical bar, as used in backtesting.
    pub fn from_bar(bar: &PriceBar) -> Self {
        let (trend, signal, volatility) = classify_change(bar.open, bar.close);
        MarketAnalysis {
            pair: bar.pair.clone(),
            trend,
            volatility,
            signal,
            price: bar.close,
            support_level: None,
            resistance_level: None,
            indicators: None,
        }
    }

    /// Analysis for live trading from reported conditions.
    pub fn from_conditions(pair: &str, price: f64, conditions: &MarketConditions) -> Self {
        MarketAnalysis {
            pair: pair.to_string(),
            trend: conditions.trend,
            volatility: conditions.volatility,
            signal: live_signal(conditions.trend, conditions.volatility),
            price,
            support_level: Some(conditions.support_level),
            resistance_level: Some(conditions.resistance_level),
            indicators: None,
        }
    }
}
