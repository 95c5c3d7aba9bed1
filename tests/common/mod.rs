#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fxlab::domain::analysis::MarketConditions;
use fxlab::domain::error::FxlabError;
pub use fxlab::domain::ohlcv::PriceBar;
use fxlab::domain::signal::Trend;
use fxlab::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;

/// Market data source serving canned bars per pair.
pub struct MockMarketData {
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub history_calls: usize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            errors: HashMap::new(),
            history_calls: 0,
        }
    }

    /// Bars for `pair` from `(open, close)` moves, one per day ending at
    /// [`end_date`].
    pub fn with_moves(mut self, pair: &str, moves: &[(f64, f64)]) -> Self {
        let n = moves.len() as i64;
        let bars = moves
            .iter()
            .enumerate()
            .map(|(i, &(open, close))| {
                make_bar(pair, end_date() - Duration::days(n - i as i64), open, close)
            })
            .collect();
        self.bars.insert(pair.to_string(), bars);
        self
    }

    pub fn with_error(mut self, pair: &str, reason: &str) -> Self {
        self.errors.insert(pair.to_string(), reason.to_string());
        self
    }

    fn check(&self, pair: &str) -> Result<&[PriceBar], FxlabError> {
        if let Some(reason) = self.errors.get(pair) {
            return Err(FxlabError::MarketData {
                reason: reason.clone(),
            });
        }
        match self.bars.get(pair) {
            Some(bars) if !bars.is_empty() => Ok(bars),
            _ => Err(FxlabError::NoData {
                pair: pair.to_string(),
            }),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn current_price(&mut self, pair: &str) -> Result<f64, FxlabError> {
        let bars = self.check(pair)?;
        Ok(bars[bars.len() - 1].close)
    }

    fn price_history(
        &mut self,
        pair: &str,
        days: usize,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, FxlabError> {
        self.history_calls += 1;
        let bars: Vec<PriceBar> = self
            .check(pair)?
            .iter()
            .filter(|b| b.timestamp < end)
            .cloned()
            .collect();
        let skip = bars.len().saturating_sub(days);
        Ok(bars.into_iter().skip(skip).collect())
    }

    fn market_conditions(&mut self, pair: &str) -> Result<MarketConditions, FxlabError> {
        let bars = self.check(pair)?;
        let last = &bars[bars.len() - 1];
        let trend = if last.close > last.open {
            Trend::Bullish
        } else if last.close < last.open {
            Trend::Bearish
        } else {
            Trend::Sideways
        };
        Ok(MarketConditions {
            trend,
            volatility: 0.2,
            support_level: last.low,
            resistance_level: last.high,
        })
    }
}

pub fn end_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(pair: &str, timestamp: NaiveDateTime, open: f64, close: f64) -> PriceBar {
    PriceBar {
        timestamp,
        pair: pair.to_string(),
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        volume: 1_000,
    }
}
