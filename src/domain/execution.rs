//! Trade execution against an account.
//!
//! Opening a trade escrows its amount from the balance; closing returns the
//! amount plus the realised profit or loss.

use chrono::NaiveDateTime;

use super::portfolio::Account;
use super::position::{ExitThresholds, Trade, TradeStatus};
use super::signal::Side;

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { trade_id: usize },
    InsufficientBalance,
    MaxPositionsReached,
}

/// Open a trade of `amount` on `pair` at `price`.
///
/// Refuses when the balance cannot cover the amount, or when `max_positions`
/// is set and already reached.
pub fn open_trade(
    account: &mut Account,
    pair: &str,
    side: Side,
    price: f64,
    amount: f64,
    timestamp: NaiveDateTime,
    max_positions: Option<usize>,
) -> EntryResult {
    if account.balance < amount {
        return EntryResult::InsufficientBalance;
    }
    if let Some(max) = max_positions {
        if account.open_count() >= max {
            return EntryResult::MaxPositionsReached;
        }
    }

    let trade_id = account.next_trade_id();
    account.trades.push(Trade {
        id: trade_id,
        timestamp,
        pair: pair.to_string(),
        side,
        entry_price: price,
        amount,
        status: TradeStatus::Open,
        exit_price: None,
        profit_loss: None,
    });
    account.balance -= amount;

    EntryResult::Entered { trade_id }
}

/// Close the trade at `index`, crediting amount + P&L. Returns the P&L, or
/// `None` if the trade does not exist or is already closed.
pub fn close_trade(account: &mut Account, index: usize, exit_price: f64) -> Option<f64> {
    let trade = account.trades.get_mut(index).filter(|t| t.is_open())?;
    let pnl = trade.close(exit_price);
    let amount = trade.amount;
    account.balance += amount + pnl;
    Some(pnl)
}

/// Close every open trade on `pair` that has hit a threshold at `price`.
/// Returns how many trades were closed.
pub fn check_exits(
    account: &mut Account,
    pair: &str,
    price: f64,
    thresholds: &ExitThresholds,
) -> usize {
    let to_close: Vec<usize> = account
        .trades
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_open() && t.pair == pair && thresholds.should_close(t, price))
        .map(|(i, _)| i)
        .collect();

    for &i in &to_close {
        close_trade(account, i, price);
    }
    to_close.len()
}
