//! Live-simulation trading bot.
//!
//! Analyses each configured pair from the market data source and opens a
//! trade on BUY/SELL signals. Trades are recorded in an [`Account`]; nothing
//! is sent to a broker.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::analysis::MarketAnalysis;
use super::config::AppConfig;
use super::error::FxlabError;
use super::execution::{open_trade, EntryResult};
use super::indicator::IndicatorSnapshot;
use super::ohlcv::closes;
use super::portfolio::Account;
use super::position::Trade;
use super::risk::position_size;
use super::signal::{validate_trade_signal, Signal};
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStatus {
    pub balance: f64,
    pub open_positions: usize,
    pub total_trades: usize,
    pub timestamp: NaiveDateTime,
}

pub struct ForexBot {
    config: AppConfig,
    market: Box<dyn MarketDataPort>,
    account: Account,
}

impl ForexBot {
    pub fn new(config: AppConfig, market: Box<dyn MarketDataPort>) -> Self {
        let account = Account::new(config.initial_balance);
        Self {
            config,
            market,
            account,
        }
    }

    pub fn balance(&self) -> f64 {
        self.account.balance
    }

    pub fn trades(&self) -> &[Trade] {
        &self.account.trades
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Live analysis of `pair`, with indicators over recent daily closes.
    pub fn analyze_market(&mut self, pair: &str) -> Result<MarketAnalysis, FxlabError> {
        let price = self.market.current_price(pair)?;
        let conditions = self.market.market_conditions(pair)?;
        let mut analysis = MarketAnalysis::from_conditions(pair, price, &conditions);

        let settings = &self.config.indicators;
        let lookback = settings
            .sma_period
            .max(settings.ema_period)
            .max(settings.rsi_period + 1);
        let bars = self.market.price_history(pair, lookback, Self::now())?;
        if !bars.is_empty() {
            analysis.indicators = Some(IndicatorSnapshot::compute(
                &closes(&bars),
                settings.sma_period,
                settings.ema_period,
                settings.rsi_period,
                settings.rsi_oversold,
                settings.rsi_overbought,
            ));
        }

        debug!(
            %pair,
            price,
            trend = %analysis.trend,
            signal = %analysis.signal,
            volatility = analysis.volatility,
            "market analysed"
        );
        Ok(analysis)
    }

    /// Open a trade of `amount` on `pair` at the current price. Returns
    /// whether a trade was opened; HOLD never trades.
    pub fn execute_trade(
        &mut self,
        signal: Signal,
        pair: &str,
        amount: f64,
    ) -> Result<bool, FxlabError> {
        let Some(side) = signal.side() else {
            return Ok(false);
        };
        let price = self.market.current_price(pair)?;

        match open_trade(
            &mut self.account,
            pair,
            side,
            price,
            amount,
            Self::now(),
            Some(self.config.max_positions),
        ) {
            EntryResult::Entered { trade_id } => {
                info!(trade_id, %pair, %side, price, amount, "trade opened");
                Ok(true)
            }
            EntryResult::InsufficientBalance => {
                let balance = self.account.balance;
                warn!(%pair, amount, balance, "insufficient balance for trade");
                Ok(false)
            }
            EntryResult::MaxPositionsReached => {
                warn!(%pair, max = self.config.max_positions, "max open positions reached");
                Ok(false)
            }
        }
    }

    /// One pass over the configured pairs. A pair whose data fails is
    /// logged and skipped.
    pub fn run_strategy(&mut self) -> Vec<MarketAnalysis> {
        let pairs = self.config.trading_pairs.clone();
        let amount = self.config.trade_amount;
        let mut analyses = Vec::with_capacity(pairs.len());

        for pair in &pairs {
            let analysis = match self.analyze_market(pair) {
                Ok(a) => a,
                Err(e) => {
                    warn!(%pair, error = %e, "analysis failed");
                    continue;
                }
            };

            if analysis.signal != Signal::Hold {
                if validate_trade_signal(analysis.signal, analysis.trend, analysis.volatility) {
                    if let Err(e) = self.execute_trade(analysis.signal, pair, amount) {
                        warn!(%pair, error = %e, "trade failed");
                    }
                } else {
                    debug!(%pair, signal = %analysis.signal, "signal rejected by validation");
                }
            }
            analyses.push(analysis);
        }

        analyses
    }

    /// Amount that risks `stop_loss_percent` of the balance if price falls
    /// back to the analysis support level.
    pub fn risk_sized_amount(&self, analysis: &MarketAnalysis) -> f64 {
        let distance = analysis
            .support_level
            .map(|s| (analysis.price - s).abs())
            .unwrap_or(0.0);
        position_size(self.account.balance, self.config.stop_loss_percent, distance)
    }

    pub fn portfolio_status(&self) -> PortfolioStatus {
        PortfolioStatus {
            balance: self.account.balance,
            open_positions: self.account.open_count(),
            total_trades: self.account.trades.len(),
            timestamp: Self::now(),
        }
    }
}
