//! Account state and balance tracking.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::position::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub timestamp: NaiveDateTime,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub balance: f64,
    pub initial_balance: f64,
    pub trades: Vec<Trade>,
    pub balance_history: Vec<BalancePoint>,
}

impl Account {
    pub fn new(initial_balance: f64) -> Self {
        Account {
            balance: initial_balance,
            initial_balance,
            trades: Vec::new(),
            balance_history: Vec::new(),
        }
    }

    pub fn open_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.is_open())
    }

    pub fn open_count(&self) -> usize {
        self.open_trades().count()
    }

    pub fn closed_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| !t.is_open())
    }

    pub fn record_balance(&mut self, timestamp: NaiveDateTime) {
        self.balance_history.push(BalancePoint {
            timestamp,
            balance: self.balance,
        });
    }

    pub fn next_trade_id(&self) -> usize {
        self.trades.len() + 1
    }
}
