//! Application configuration model.
//!
//! Trading keys sit at the top level of the JSON document; bot framework
//! settings live under `framework`. Every key has a default so partial files
//! load cleanly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::error::FxlabError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub initial_balance: f64,
    pub trade_amount: f64,
    pub trading_pairs: Vec<String>,
    pub risk_level: String,
    pub max_positions: usize,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    pub strategy_type: String,
    pub timeframe: String,
    pub indicators: IndicatorSettings,
    pub trading_hours: TradingHours,
    pub framework: FrameworkSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingHours {
    pub start: String,
    pub end: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkSettings {
    pub registry_file: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            initial_balance: 10_000.0,
            trade_amount: 100.0,
            trading_pairs: ["EUR/USD", "GBP/USD", "USD/JPY", "AUD/USD", "USD/CAD"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            risk_level: "MEDIUM".into(),
            max_positions: 5,
            stop_loss_percent: 2.0,
            take_profit_percent: 4.0,
            strategy_type: "TREND_FOLLOWING".into(),
            timeframe: "1H".into(),
            indicators: IndicatorSettings::default(),
            trading_hours: TradingHours::default(),
            framework: FrameworkSettings::default(),
        }
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            sma_period: 20,
            ema_period: 12,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl Default for TradingHours {
    fn default() -> Self {
        TradingHours {
            start: "08:00".into(),
            end: "17:00".into(),
            timezone: "UTC".into(),
        }
    }
}

impl Default for FrameworkSettings {
    fn default() -> Self {
        FrameworkSettings {
            registry_file: "bot_registry.json".into(),
            log_level: "INFO".into(),
        }
    }
}

impl AppConfig {
    /// Apply a shallow JSON patch: each top-level key in `patch` replaces
    /// the current value.
    pub fn merged(&self, patch: &Value) -> Result<AppConfig, FxlabError> {
        let Value::Object(updates) = patch else {
            return Err(FxlabError::ConfigInvalid {
                key: "<root>".into(),
                reason: "update must be a JSON object".into(),
            });
        };
        let mut current = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut current {
            for (key, value) in updates {
                map.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(current)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl FromStr for RiskLevel {
    type Err = FxlabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            _ => Err(FxlabError::ConfigInvalid {
                key: "risk_level".into(),
                reason: "Risk level must be LOW, MEDIUM, or HIGH".into(),
            }),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("LOW"),
            RiskLevel::Medium => f.write_str("MEDIUM"),
            RiskLevel::High => f.write_str("HIGH"),
        }
    }
}
