//! CSV file data adapter.
//!
//! One file per market and timeframe: `<BASE>_<QUOTE>_<tf>.csv` with header
//! `timestamp,open,high,low,close,volume`.

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::timeframe::Timeframe;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, market: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", market.replace('/', "_"), timeframe))
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SignalbenchError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|e| SignalbenchError::data(format!("invalid timestamp '{raw}': {e}")))
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        market: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<PriceBar>, SignalbenchError> {
        let path = self.csv_path(market, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| {
            SignalbenchError::data(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<CandleRow>().enumerate() {
            let row = result.map_err(|e| {
                SignalbenchError::data(format!("{}: row {}: {}", path.display(), line + 1, e))
            })?;
            bars.push(PriceBar {
                timestamp: parse_timestamp(&row.timestamp)?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        if bars.is_empty() {
            return Err(SignalbenchError::NoData {
                market: market.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if bars.len() > limit {
            bars.drain(..bars.len() - limit);
        }
        debug!(path = %path.display(), bars = bars.len(), "loaded candles");
        Ok(bars)
    }

    fn list_markets(&self, timeframe: Timeframe) -> Result<Vec<String>, SignalbenchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            SignalbenchError::data(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut markets = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| {
                SignalbenchError::data(format!("directory entry error: {}", e))
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(&suffix) {
                if let Some((base, quote)) = stem.split_once('_') {
                    markets.push(format!("{base}/{quote}"));
                }
            }
        }

        markets.sort();
        Ok(markets)
    }
}
