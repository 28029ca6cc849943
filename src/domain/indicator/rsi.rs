//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (flat prices), in
//! which case RSI = 50.
//!
//! Warmup: first n bars are invalid (need n price changes for the first average).

use crate::domain::error::SignalbenchError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

/// RSI reported when there has been no movement at all.
pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, SignalbenchError> {
    let indicator_type = IndicatorType::Rsi(period);
    if period == 0 {
        return Err(SignalbenchError::parameter("RSI period must be positive"));
    }
    if bars.len() < period + 1 {
        return Err(SignalbenchError::InsufficientData {
            what: indicator_type.to_string(),
            bars: bars.len(),
            minimum: period + 1,
        });
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = bars
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut values = Vec::with_capacity(bars.len());
    for bar in &bars[..period] {
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: false,
            value: f64::NAN,
        });
    }

    let n = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / n;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / n;
    values.push(IndicatorPoint {
        timestamp: bars[period].timestamp,
        valid: true,
        value: rsi_from_averages(avg_gain, avg_loss),
    });

    for (i, bar) in bars.iter().enumerate().skip(period + 1) {
        let change_idx = i - 1;
        avg_gain = (avg_gain * (n - 1.0) + gains[change_idx]) / n;
        avg_loss = (avg_loss * (n - 1.0) + losses[change_idx]) / n;
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: rsi_from_averages(avg_gain, avg_loss),
        });
    }

    Ok(IndicatorSeries {
        indicator_type,
        values,
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { NEUTRAL_RSI } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
