//! Core domain types and logic.

pub mod analysis;
pub mod backtest;
pub mod bot;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod forex_bot;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod risk;
pub mod signal;
