#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use signalbench::domain::error::SignalbenchError;
pub use signalbench::domain::ohlcv::PriceBar;
use signalbench::domain::timeframe::Timeframe;
use signalbench::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, market: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(market.to_string(), bars);
        self
    }

    pub fn with_error(mut self, market: &str, reason: &str) -> Self {
        self.errors.insert(market.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(
        &self,
        market: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<PriceBar>, SignalbenchError> {
        if let Some(reason) = self.errors.get(market) {
            return Err(SignalbenchError::data(reason.clone()));
        }
        match self.data.get(market) {
            Some(bars) if !bars.is_empty() => {
                let skip = bars.len().saturating_sub(limit);
                Ok(bars[skip..].to_vec())
            }
            _ => Err(SignalbenchError::NoData {
                market: market.to_string(),
                timeframe: timeframe.to_string(),
            }),
        }
    }

    fn list_markets(&self, _timeframe: Timeframe) -> Result<Vec<String>, SignalbenchError> {
        let mut markets: Vec<String> = self.data.keys().cloned().collect();
        markets.sort();
        Ok(markets)
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly bars with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::from_close(start() + TimeDelta::hours(i as i64), c))
        .collect()
}

pub fn constant_bars(count: usize, price: f64) -> Vec<PriceBar> {
    bars_from_closes(&vec![price; count])
}

pub fn rising_bars(count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + step * i as f64).collect();
    bars_from_closes(&closes)
}

/// Flat at 100, a steady climb to 130, then a steady slide to 70.
///
/// EMA(3,6) golden-crosses once on the climb and death-crosses once on the
/// slide.
pub fn single_cross_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 20];
    closes.extend((1..=10).map(|i| 100.0 + 3.0 * i as f64));
    closes.extend((1..=20).map(|i| 130.0 - 3.0 * i as f64));
    closes
}

/// Write one `<BASE>_<QUOTE>_<tf>.csv` file in `dir`.
pub fn write_candle_csv(dir: &std::path::Path, market: &str, timeframe: &str, closes: &[f64]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for (i, bar) in bars_from_closes(closes).iter().enumerate() {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            1000 + i
        ));
    }
    let name = format!("{}_{}.csv", market.replace('/', "_"), timeframe);
    std::fs::write(dir.join(name), content).unwrap();
}
