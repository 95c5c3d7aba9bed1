//! Market data access port trait.
//!
//! Methods take `&mut self` so simulated sources can advance their RNG.

use crate::domain::analysis::MarketConditions;
use crate::domain::error::FxlabError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDateTime;

pub trait MarketDataPort {
    fn current_price(&mut self, pair: &str) -> Result<f64, FxlabError>;

    /// `days` daily bars for `pair`, oldest first, the last one dated the
    /// day before `end`.
    fn price_history(
        &mut self,
        pair: &str,
        days: usize,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, FxlabError>;

    fn market_conditions(&mut self, pair: &str) -> Result<MarketConditions, FxlabError>;
}
