//! Performance statistics over closed trades and balance history.

use super::portfolio::{Account, BalancePoint};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_profit: f64,
    pub total_loss: f64,
    /// Percentage of closed trades with positive P&L.
    pub win_rate: f64,
    /// Percentage change of the balance over the run.
    pub roi: f64,
    /// Largest peak-to-trough fall of the balance, in percent.
    pub max_drawdown: f64,
}

impl TradeStats {
    pub fn compute(account: &Account) -> Self {
        let mut stats = TradeStats::default();

        for trade in account.closed_trades() {
            stats.total_trades += 1;
            let pnl = trade.profit_loss.unwrap_or(0.0);
            if pnl > 0.0 {
                stats.winning_trades += 1;
                stats.total_profit += pnl;
            } else if pnl < 0.0 {
                stats.losing_trades += 1;
                stats.total_loss += pnl.abs();
            }
        }

        if stats.total_trades > 0 {
            stats.win_rate = stats.winning_trades as f64 / stats.total_trades as f64 * 100.0;
        }

        if account.initial_balance > 0.0 {
            stats.roi =
                (account.balance - account.initial_balance) / account.initial_balance * 100.0;
        }

        stats.max_drawdown = compute_drawdown(&account.balance_history) * 100.0;
        stats
    }
}

/// Largest fractional decline from a running peak.
pub fn compute_drawdown(history: &[BalancePoint]) -> f64 {
    let Some(first) = history.first() else {
        return 0.0;
    };

    let mut peak = first.balance;
    let mut max_dd = 0.0_f64;

    for point in history {
        if point.balance > peak {
            peak = point.balance;
        } else if peak > 0.0 {
            let dd = (peak - point.balance) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
