//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first price, then EMA = P*k + EMA*(1-k)
//! over every following price.

pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    let (&first, rest) = prices.split_first()?;
    let k = 2.0 / (period as f64 + 1.0);
    let ema = rest
        .iter()
        .fold(first, |ema, &price| price * k + ema * (1.0 - k));
    Some(ema)
}
