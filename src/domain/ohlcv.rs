//! Price bar representation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub pair: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Closing prices of a bar slice, oldest first.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar(open: f64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            pair: "EUR/USD".into(),
            open,
            high: open.max(close) + 0.01,
            low: open.min(close) - 0.01,
            close,
            volume: 5_000,
        }
    }

    #[test]
    fn closes_in_order() {
        let bars = vec![sample_bar(1.0, 1.1), sample_bar(1.1, 1.2)];
        assert_eq!(closes(&bars), vec![1.1, 1.2]);
    }
}
