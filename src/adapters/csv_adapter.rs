//! CSV file market data adapter.
//!
//! Replays recorded bars from `<base_path>/<PAIR>.csv`, where the pair's `/`
//! is dropped (`EUR/USD` → `EURUSD.csv`). Columns:
//! `timestamp,open,high,low,close,volume`.

use crate::domain::analysis::MarketConditions;
use crate::domain::error::FxlabError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::classify_change;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Bars considered when deriving support and resistance.
const LEVEL_WINDOW: usize = 20;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, pair: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", pair.replace('/', "")))
    }

    /// Every bar in the pair's file, oldest first.
    pub fn load_bars(&self, pair: &str) -> Result<Vec<PriceBar>, FxlabError> {
        let path = self.csv_path(pair);
        let content = fs::read_to_string(&path).map_err(|e| FxlabError::MarketData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FxlabError::MarketData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| FxlabError::MarketData {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(ts_str)?;

            bars.push(PriceBar {
                timestamp,
                pair: pair.to_string(),
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn non_empty_bars(&self, pair: &str) -> Result<Vec<PriceBar>, FxlabError> {
        let bars = self.load_bars(pair)?;
        if bars.is_empty() {
            return Err(FxlabError::NoData {
                pair: pair.to_string(),
            });
        }
        Ok(bars)
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, FxlabError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| FxlabError::MarketData {
            reason: format!("invalid timestamp {value:?}: {e}"),
        })
}

fn parse_field<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, FxlabError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| FxlabError::MarketData {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| FxlabError::MarketData {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl MarketDataPort for CsvAdapter {
    fn current_price(&mut self, pair: &str) -> Result<f64, FxlabError> {
        let bars = self.non_empty_bars(pair)?;
        Ok(bars.last().map(|b| b.close).unwrap_or_default())
    }

    fn price_history(
        &mut self,
        pair: &str,
        days: usize,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, FxlabError> {
        let mut bars = self.load_bars(pair)?;
        bars.retain(|b| b.timestamp < end);
        let skip = bars.len().saturating_sub(days);
        Ok(bars.split_off(skip))
    }

    fn market_conditions(&mut self, pair: &str) -> Result<MarketConditions, FxlabError> {
        let bars = self.non_empty_bars(pair)?;
        let recent = &bars[bars.len().saturating_sub(LEVEL_WINDOW)..];
        let last = &recent[recent.len() - 1];
        let (trend, _, volatility) = classify_change(last.open, last.close);

        let support_level = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let resistance_level = recent
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(MarketConditions {
            trend,
            volatility,
            support_level,
            resistance_level,
        })
    }
}
