//! Simple Moving Average.
//!
//! Mean of the last `period` prices. With fewer than `period` prices the
//! mean of all available prices is used instead.

pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.is_empty() {
        return None;
    }
    let window = &prices[prices.len().saturating_sub(period)..];
    Some(window.iter().sum::<f64>() / window.len() as f64)
}
