//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = EMA[i-1] + k * (C[i] - EMA[i-1]).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::error::SignalbenchError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, SignalbenchError> {
    let indicator_type = IndicatorType::Ema(period);
    if period == 0 {
        return Err(SignalbenchError::parameter("EMA period must be positive"));
    }
    if bars.len() < period {
        return Err(SignalbenchError::InsufficientData {
            what: indicator_type.to_string(),
            bars: bars.len(),
            minimum: period,
        });
    }

    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let valid = if i < period - 1 {
            sum += bar.close;
            false
        } else if i == period - 1 {
            sum += bar.close;
            ema = sum / period as f64;
            true
        } else {
            // Incremental form keeps a flat series exactly flat.
            ema += k * (bar.close - ema);
            true
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: if valid { ema } else { f64::NAN },
        });
    }

    Ok(IndicatorSeries {
        indicator_type,
        values,
    })
}
