//! Trade records and position lifecycle.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::signal::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: usize,
    pub timestamp: NaiveDateTime,
    pub pair: String,
    pub side: Side,
    pub entry_price: f64,
    pub amount: f64,
    pub status: TradeStatus,
    pub exit_price: Option<f64>,
    pub profit_loss: Option<f64>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Fractional move in the trade's favour at `price` (negative when against).
    pub fn favourable_change(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        match self.side {
            Side::Buy => (price - self.entry_price) / self.entry_price,
            Side::Sell => (self.entry_price - price) / self.entry_price,
        }
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        profit_loss(self.entry_price, price, self.side, self.amount)
    }

    /// Mark the trade closed at `exit_price`, returning the realised P&L.
    pub fn close(&mut self, exit_price: f64) -> f64 {
        let pnl = self.unrealized_pnl(exit_price);
        self.exit_price = Some(exit_price);
        self.profit_loss = Some(pnl);
        self.status = TradeStatus::Closed;
        pnl
    }
}

/// BUY: (exit - entry) * size. SELL: (entry - exit) * size.
pub fn profit_loss(entry_price: f64, exit_price: f64, side: Side, size: f64) -> f64 {
    match side {
        Side::Buy => (exit_price - entry_price) * size,
        Side::Sell => (entry_price - exit_price) * size,
    }
}

/// Percentage thresholds at which an open trade is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitThresholds {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
}

impl Default for ExitThresholds {
    fn default() -> Self {
        ExitThresholds {
            take_profit_pct: 2.0,
            stop_loss_pct: 1.0,
        }
    }
}

impl ExitThresholds {
    pub fn should_close(&self, trade: &Trade, price: f64) -> bool {
        let change = trade.favourable_change(price);
        change >= self.take_profit_pct / 100.0 || change <= -self.stop_loss_pct / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_trade(side: Side) -> Trade {
        Trade {
            id: 1,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            pair: "EUR/USD".into(),
            side,
            entry_price: 1.0,
            amount: 100.0,
            status: TradeStatus::Open,
            exit_price: None,
            profit_loss: None,
        }
    }

    #[test]
    fn profit_loss_buy() {
        assert!((profit_loss(1.10, 1.20, Side::Buy, 100.0) - 10.0).abs() < 1e-9);
        assert!((profit_loss(1.20, 1.10, Side::Buy, 100.0) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn profit_loss_sell() {
        assert!((profit_loss(1.20, 1.10, Side::Sell, 100.0) - 10.0).abs() < 1e-9);
        assert!((profit_loss(1.10, 1.20, Side::Sell, 100.0) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn favourable_change_by_side() {
        let buy = sample_trade(Side::Buy);
        let sell = sample_trade(Side::Sell);
        assert!((buy.favourable_change(1.05) - 0.05).abs() < 1e-12);
        assert!((sell.favourable_change(1.05) + 0.05).abs() < 1e-12);
    }

    #[test]
    fn close_sets_exit_fields() {
        let mut trade = sample_trade(Side::Buy);
        let pnl = trade.close(1.5);
        assert!((pnl - 50.0).abs() < 1e-9);
        assert_eq!(trade.status, TradeStatus::Closed);
        assert_eq!(trade.exit_price, Some(1.5));
        assert_eq!(trade.profit_loss, Some(pnl));
        assert!(!trade.is_open());
    }

    #[test]
    fn default_thresholds_take_profit() {
        let t = ExitThresholds::default();
        let buy = sample_trade(Side::Buy);
        assert!(t.should_close(&buy, 1.03));
        assert!(!t.should_close(&buy, 1.015));
    }

    #[test]
    fn default_thresholds_stop_loss() {
        let t = ExitThresholds::default();
        let buy = sample_trade(Side::Buy);
        let sell = sample_trade(Side::Sell);
        assert!(t.should_close(&buy, 0.985));
        assert!(!t.should_close(&buy, 0.995));
        assert!(t.should_close(&sell, 1.015));
        assert!(t.should_close(&sell, 0.97));
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&TradeStatus::Open).unwrap(),
            "\"OPEN\""
        );
    }
}
