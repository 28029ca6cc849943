//! Seeded synthetic price generator.
//!
//! Geometric random walk: each bar's log return is N(0, 2%). Open is the
//! previous close, high/low widen the body by up to ~0.5%, and timestamps
//! start at 2024-01-01 00:00 spaced by the timeframe. The market name only
//! labels the request; every market gets the same series for a given seed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::timeframe::Timeframe;
use crate::ports::data_port::DataPort;

pub const DEFAULT_SEED: u64 = 42;
const BASE_PRICE: f64 = 10.0;
const VOLATILITY: f64 = 0.02;
const WICK_VOLATILITY: f64 = 0.005;
const VOLUME_SCALE: f64 = 1_000_000.0;

/// Markets advertised by [`DataPort::list_markets`].
const MARKETS: [&str; 4] = ["BTC/USDT", "ETH/USDT", "INJ/USDT", "SOL/USDT"];

pub struct SyntheticAdapter {
    seed: u64,
}

impl SyntheticAdapter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn start_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN)
    }
}

impl Default for SyntheticAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

fn normal(std_dev: f64) -> Result<Normal<f64>, SignalbenchError> {
    Normal::new(0.0, std_dev)
        .map_err(|e| SignalbenchError::computation(format!("invalid normal distribution: {e}")))
}

impl DataPort for SyntheticAdapter {
    fn fetch_candles(
        &self,
        market: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<PriceBar>, SignalbenchError> {
        if limit == 0 {
            return Err(SignalbenchError::NoData {
                market: market.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        let returns = normal(VOLATILITY)?;
        let wicks = normal(WICK_VOLATILITY)?;
        let volumes = normal(VOLUME_SCALE)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let start = Self::start_time();
        let step = timeframe.bar_duration();

        let mut bars = Vec::with_capacity(limit);
        let mut log_price = BASE_PRICE.ln();
        let mut prev_close = BASE_PRICE;
        let mut timestamp = start;

        for _ in 0..limit {
            log_price += returns.sample(&mut rng);
            let close = log_price.exp();
            let open = prev_close;
            let high = open.max(close) * (1.0 + wicks.sample(&mut rng).abs());
            let low = open.min(close) * (1.0 - wicks.sample(&mut rng).abs());
            let volume = volumes.sample(&mut rng).abs();

            bars.push(PriceBar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
            prev_close = close;
            timestamp += step;
        }

        debug!(
            market,
            timeframe = %timeframe,
            seed = self.seed,
            bars = bars.len(),
            "generated synthetic candles"
        );
        Ok(bars)
    }

    fn list_markets(&self, _timeframe: Timeframe) -> Result<Vec<String>, SignalbenchError> {
        Ok(MARKETS.iter().map(|m| m.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_series() {
        let a = SyntheticAdapter::new(7)
            .fetch_candles("INJ/USDT", Timeframe::H1, 200)
            .unwrap();
        let b = SyntheticAdapter::new(7)
            .fetch_candles("INJ/USDT", Timeframe::H1, 200)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_series() {
        let a = SyntheticAdapter::new(1)
            .fetch_candles("INJ/USDT", Timeframe::H1, 50)
            .unwrap();
        let b = SyntheticAdapter::new(2)
            .fetch_candles("INJ/USDT", Timeframe::H1, 50)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn bars_are_well_formed() {
        let bars = SyntheticAdapter::default()
            .fetch_candles("BTC/USDT", Timeframe::H4, 500)
            .unwrap();
        assert_eq!(bars.len(), 500);
        assert_eq!(bars[0].open, BASE_PRICE);
        for bar in &bars {
            assert!(bar.close > 0.0);
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.volume >= 0.0);
        }
        for pair in bars.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
        }
    }

    #[test]
    fn log_returns_match_configured_volatility() {
        let bars = SyntheticAdapter::default()
            .fetch_candles("INJ/USDT", Timeframe::H1, 5000)
            .unwrap();
        let returns: Vec<f64> = bars
            .windows(2)
            .map(|w| (w[1].close / w[0].close).ln())
            .collect();
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let std = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 0.002, "mean = {mean}");
        assert!((std - VOLATILITY).abs() < 0.002, "std = {std}");
    }

    #[test]
    fn negative_spread_is_rejected() {
        assert!(normal(0.0).is_ok());
        assert!(normal(-1.0).is_err());
    }

    #[test]
    fn timestamps_follow_timeframe() {
        let bars = SyntheticAdapter::default()
            .fetch_candles("INJ/USDT", Timeframe::M15, 4)
            .unwrap();
        assert_eq!(bars[0].timestamp, SyntheticAdapter::start_time());
        assert_eq!(
            bars[3].timestamp - bars[0].timestamp,
            chrono::TimeDelta::minutes(45)
        );
    }

    #[test]
    fn zero_limit_is_no_data() {
        let err = SyntheticAdapter::default()
            .fetch_candles("INJ/USDT", Timeframe::H1, 0)
            .unwrap_err();
        assert!(matches!(err, SignalbenchError::NoData { .. }));
    }

    #[test]
    fn lists_markets() {
        let markets = SyntheticAdapter::default().list_markets(Timeframe::H1).unwrap();
        assert!(markets.contains(&"INJ/USDT".to_string()));
    }
}
