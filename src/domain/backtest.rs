//! Backtest engine and event loop.
//!
//! Each configured pair is replayed bar by bar: analyse the bar, close this
//! pair's trades that hit a threshold, open a trade on a BUY/SELL signal,
//! then record the balance. Trades still open after the last pair are closed
//! at the final price of their pair.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::analysis::MarketAnalysis;
use super::config::AppConfig;
use super::error::FxlabError;
use super::execution::{check_exits, close_trade, open_trade, EntryResult};
use super::metrics::TradeStats;
use super::portfolio::{Account, BalancePoint};
use super::position::{ExitThresholds, Trade};
use crate::ports::market_data_port::MarketDataPort;

pub const DEFAULT_BACKTEST_DAYS: usize = 30;

/// Longest backtest window, in days.
pub const MAX_BACKTEST_DAYS: usize = 3650;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub trade_amount: f64,
    pub trading_pairs: Vec<String>,
    pub days: usize,
    pub end: NaiveDateTime,
    pub thresholds: ExitThresholds,
}

impl BacktestConfig {
    /// Backtest settings from the application config. Exit thresholds keep
    /// the backtester's fixed 2% / 1% rule.
    pub fn from_app_config(config: &AppConfig, days: usize, end: NaiveDateTime) -> Self {
        BacktestConfig {
            initial_balance: config.initial_balance,
            trade_amount: config.trade_amount,
            trading_pairs: config.trading_pairs.clone(),
            days,
            end,
            thresholds: ExitThresholds::default(),
        }
    }

    /// `end - days`. Fails when `days` exceeds [`MAX_BACKTEST_DAYS`] or the
    /// start falls outside the calendar.
    pub fn start(&self) -> Result<NaiveDateTime, FxlabError> {
        let invalid = || FxlabError::ConfigInvalid {
            key: "days".into(),
            reason: format!("must be at most {MAX_BACKTEST_DAYS}, got {}", self.days),
        };
        if self.days > MAX_BACKTEST_DAYS {
            return Err(invalid());
        }
        let span = i64::try_from(self.days)
            .ok()
            .and_then(Duration::try_days)
            .ok_or_else(invalid)?;
        self.end.checked_sub_signed(span).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_profit: f64,
    pub total_loss: f64,
    pub win_rate: f64,
    pub roi: f64,
    pub max_drawdown: f64,
    pub pairs_tested: Vec<String>,
    #[serde(skip)]
    pub trades: Vec<Trade>,
    #[serde(skip)]
    pub balance_history: Vec<BalancePoint>,
}

impl BacktestResult {
    fn from_account(
        config: &BacktestConfig,
        start_date: NaiveDateTime,
        account: Account,
        pairs_tested: Vec<String>,
    ) -> Self {
        let stats = TradeStats::compute(&account);
        BacktestResult {
            start_date,
            end_date: config.end,
            initial_balance: account.initial_balance,
            final_balance: account.balance,
            total_trades: stats.total_trades,
            winning_trades: stats.winning_trades,
            losing_trades: stats.losing_trades,
            total_profit: stats.total_profit,
            total_loss: stats.total_loss,
            win_rate: stats.win_rate,
            roi: stats.roi,
            max_drawdown: stats.max_drawdown,
            pairs_tested,
            trades: account.trades,
            balance_history: account.balance_history,
        }
    }
}

pub fn run_backtest(
    data: &mut dyn MarketDataPort,
    config: &BacktestConfig,
) -> Result<BacktestResult, FxlabError> {
    let start_date = config.start()?;
    info!(days = config.days, pairs = config.trading_pairs.len(), "running backtest");

    let mut account = Account::new(config.initial_balance);
    let mut final_prices: HashMap<String, f64> = HashMap::new();
    let mut pairs_tested = Vec::with_capacity(config.trading_pairs.len());

    for pair in &config.trading_pairs {
        let bars = match data.price_history(pair, config.days, config.end) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(%pair, error = %e, "skipping pair");
                continue;
            }
        };
        info!(%pair, bars = bars.len(), "testing pair");

        for bar in &bars {
            let analysis = MarketAnalysis::from_bar(bar);

            let closed = check_exits(&mut account, pair, bar.close, &config.thresholds);
            if closed > 0 {
                debug!(%pair, closed, price = bar.close, "closed positions");
            }

            if let Some(side) = analysis.signal.side() {
                let entry = open_trade(
                    &mut account,
                    pair,
                    side,
                    analysis.price,
                    config.trade_amount,
                    bar.timestamp,
                    None,
                );
                if let EntryResult::Entered { trade_id } = entry {
                    debug!(%pair, trade_id, %side, price = analysis.price, "opened trade");
                }
            }

            account.record_balance(bar.timestamp);
        }

        if let Some(last) = bars.last() {
            final_prices.insert(pair.clone(), last.close);
        }
        pairs_tested.push(pair.clone());
    }

    for i in 0..account.trades.len() {
        if !account.trades[i].is_open() {
            continue;
        }
        let pair = account.trades[i].pair.clone();
        let price = match final_prices.get(&pair) {
            Some(&p) => p,
            None => data.current_price(&pair)?,
        };
        close_trade(&mut account, i, price);
    }

    let result = BacktestResult::from_account(config, start_date, account, pairs_tested);
    info!(
        trades = result.total_trades,
        final_balance = result.final_balance,
        roi = result.roi,
        "backtest complete"
    );
    Ok(result)
}
