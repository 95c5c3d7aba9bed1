//! RSI (Relative Strength Index).
//!
//! Averages are the simple mean of the last n gains and losses:
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)).
//! If avg_loss == 0: RSI = 100.
//!
//! With fewer than n + 1 prices there are not enough changes to average and
//! the neutral value is returned.

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let recent = &prices[prices.len() - (period + 1)..];
    let (gain_sum, loss_sum) = recent.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let change = w[1] - w[0];
        if change > 0.0 {
            (g + change, l)
        } else {
            (g, l - change)
        }
    });

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}
