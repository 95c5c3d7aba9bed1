//! Configuration validation.
//!
//! Validates trading parameters before a bot or backtest runs.

use super::config::{AppConfig, RiskLevel};
use super::error::FxlabError;

pub fn validate_config(config: &AppConfig) -> Result<(), FxlabError> {
    validate_initial_balance(config)?;
    validate_trade_amount(config)?;
    validate_trading_pairs(config)?;
    validate_risk_level(config)?;
    Ok(())
}

fn validate_initial_balance(config: &AppConfig) -> Result<(), FxlabError> {
    if !config.initial_balance.is_finite() || config.initial_balance <= 0.0 {
        return Err(FxlabError::ConfigInvalid {
            key: "initial_balance".to_string(),
            reason: "Initial balance must be a positive number".to_string(),
        });
    }
    Ok(())
}

fn validate_trade_amount(config: &AppConfig) -> Result<(), FxlabError> {
    if !config.trade_amount.is_finite() || config.trade_amount <= 0.0 {
        return Err(FxlabError::ConfigInvalid {
            key: "trade_amount".to_string(),
            reason: "Trade amount must be a positive number".to_string(),
        });
    }
    if config.trade_amount > config.initial_balance {
        return Err(FxlabError::ConfigInvalid {
            key: "trade_amount".to_string(),
            reason: "Trade amount cannot exceed initial balance".to_string(),
        });
    }
    Ok(())
}

fn validate_trading_pairs(config: &AppConfig) -> Result<(), FxlabError> {
    if config.trading_pairs.iter().all(|p| p.trim().is_empty()) {
        return Err(FxlabError::ConfigInvalid {
            key: "trading_pairs".to_string(),
            reason: "At least one trading pair must be specified".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_level(config: &AppConfig) -> Result<(), FxlabError> {
    config.risk_level.parse::<RiskLevel>().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(config: &AppConfig, expected_key: &str) {
        match validate_config(config) {
            Err(FxlabError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {expected_key}, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_positive_balance() {
        let c = AppConfig {
            initial_balance: 0.0,
            ..AppConfig::default()
        };
        assert_invalid(&c, "initial_balance");
    }

    #[test]
    fn rejects_non_positive_amount() {
        let c = AppConfig {
            trade_amount: -5.0,
            ..AppConfig::default()
        };
        assert_invalid(&c, "trade_amount");
    }

    #[test]
    fn rejects_non_finite_amounts() {
        for bad in [f64::NAN, f64::INFINITY] {
            let c = AppConfig {
                initial_balance: bad,
                ..AppConfig::default()
            };
            assert_invalid(&c, "initial_balance");

            let c = AppConfig {
                trade_amount: bad,
                ..AppConfig::default()
            };
            assert_invalid(&c, "trade_amount");
        }
    }

    #[test]
    fn rejects_amount_above_balance() {
        let c = AppConfig {
            initial_balance: 50.0,
            trade_amount: 100.0,
            ..AppConfig::default()
        };
        assert_invalid(&c, "trade_amount");
    }

    #[test]
    fn rejects_empty_pairs() {
        let c = AppConfig {
            trading_pairs: vec![],
            ..AppConfig::default()
        };
        assert_invalid(&c, "trading_pairs");
    }

    #[test]
    fn rejects_unknown_risk_level() {
        let c = AppConfig {
            risk_level: "EXTREME".into(),
            ..AppConfig::default()
        };
        assert_invalid(&c, "risk_level");
    }
}
