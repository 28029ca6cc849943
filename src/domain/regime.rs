//! Market regime classification from the raw price series.
//!
//! Strategy-independent. Trend strength is the R² of a least-squares line
//! through the closes; volatility is the annualized standard deviation of log
//! returns. High volatility overrides everything else.

use serde::Serialize;
use std::fmt;

use super::error::SignalbenchError;
use super::ohlcv::{closes, ensure_valid_closes, PriceBar};
use super::stats::{population_std, round4};
use super::timeframe::Timeframe;

/// Annualized volatility above which the market is `Volatile`.
pub const VOLATILE_THRESHOLD: f64 = 1.5;
/// R² above which the market is `Trending`.
pub const TRENDING_THRESHOLD: f64 = 0.6;
/// Upper bound (exclusive) of the `Low` volatility bucket.
pub const LOW_VOLATILITY_CUTOFF: f64 = 0.5;
/// Upper bound (exclusive) of the `Medium` volatility bucket.
pub const MEDIUM_VOLATILITY_CUTOFF: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketRegime {
    Trending,
    Ranging,
    Volatile,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketRegime::Trending => "Trending",
            MarketRegime::Ranging => "Ranging",
            MarketRegime::Volatile => "Volatile",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    pub fn from_value(volatility: f64) -> Self {
        if volatility < LOW_VOLATILITY_CUTOFF {
            VolatilityLevel::Low
        } else if volatility < MEDIUM_VOLATILITY_CUTOFF {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::High
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityLevel::Low => "Low",
            VolatilityLevel::Medium => "Medium",
            VolatilityLevel::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeClassification {
    pub regime: MarketRegime,
    pub trend_strength: f64,
    pub volatility_level: VolatilityLevel,
    pub volatility_value: f64,
    pub price_change_pct: f64,
}

pub fn classify_regime(
    bars: &[PriceBar],
    timeframe: Timeframe,
) -> Result<RegimeClassification, SignalbenchError> {
    if bars.len() < 2 {
        return Err(SignalbenchError::InsufficientData {
            what: "regime classification".to_string(),
            bars: bars.len(),
            minimum: 2,
        });
    }
    ensure_valid_closes(bars)?;

    let prices = closes(bars);
    let trend_strength = trend_strength(&prices);
    let volatility = annualized_volatility(&prices, timeframe);
    if !trend_strength.is_finite() || !volatility.is_finite() {
        return Err(SignalbenchError::computation(
            "regime statistics are not finite",
        ));
    }

    let first = prices[0];
    let last = prices[prices.len() - 1];
    let price_change_pct = (last - first) / first;

    let regime = if volatility > VOLATILE_THRESHOLD {
        MarketRegime::Volatile
    } else if trend_strength > TRENDING_THRESHOLD {
        MarketRegime::Trending
    } else {
        MarketRegime::Ranging
    };

    Ok(RegimeClassification {
        regime,
        trend_strength: round4(trend_strength),
        volatility_level: VolatilityLevel::from_value(volatility),
        volatility_value: round4(volatility),
        price_change_pct: round4(price_change_pct),
    })
}

/// Coefficient of determination of a linear fit against the bar index,
/// clipped to [0, 1]. A flat series has no trend.
fn trend_strength(prices: &[f64]) -> f64 {
    let n = prices.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = prices.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in prices.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        ss_tot += dy * dy;
    }

    if ss_tot == 0.0 || sxx == 0.0 {
        return 0.0;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let ss_res: f64 = prices
        .iter()
        .enumerate()
        .map(|(i, &y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();

    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

fn annualized_volatility(prices: &[f64], timeframe: Timeframe) -> f64 {
    let log_returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    population_std(&log_returns) * timeframe.periods_per_year().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PriceBar::from_close(start + chrono::TimeDelta::hours(i as i64), close)
            })
            .collect()
    }

    #[test]
    fn regime_needs_two_bars() {
        let err = classify_regime(&make_bars(&[100.0]), Timeframe::H1).unwrap_err();
        assert!(matches!(
            err,
            SignalbenchError::InsufficientData { minimum: 2, .. }
        ));
    }

    #[test]
    fn constant_series_is_calm_and_ranging() {
        let result = classify_regime(&make_bars(&[100.0; 50]), Timeframe::H1).unwrap();
        assert_eq!(result.regime, MarketRegime::Ranging);
        assert_eq!(result.trend_strength, 0.0);
        assert_eq!(result.volatility_value, 0.0);
        assert_eq!(result.volatility_level, VolatilityLevel::Low);
        assert_eq!(result.price_change_pct, 0.0);
    }

    #[test]
    fn smooth_uptrend_is_trending() {
        let prices: Vec<f64> = (0..100).map(|i| 100.0 + i as f64 * 0.01).collect();
        let result = classify_regime(&make_bars(&prices), Timeframe::H1).unwrap();
        assert_eq!(result.regime, MarketRegime::Trending);
        assert!(result.trend_strength > 0.99);
        assert_relative_eq!(result.price_change_pct, 0.0099);
    }

    #[test]
    fn oscillation_is_ranging() {
        let prices: Vec<f64> = (0..200)
            .map(|i| 100.0 + 0.05 * (i as f64 / 3.0).sin())
            .collect();
        let result = classify_regime(&make_bars(&prices), Timeframe::H1).unwrap();
        assert_eq!(result.regime, MarketRegime::Ranging);
        assert!(result.trend_strength < TRENDING_THRESHOLD);
    }

    #[test]
    fn wild_swings_are_volatile_even_with_trend() {
        // 5% swings every bar on an hourly grid annualize far above 1.5
        let prices: Vec<f64> = (0..100)
            .map(|i| {
                let base = 100.0 + i as f64;
                if i % 2 == 0 { base * 1.05 } else { base * 0.95 }
            })
            .collect();
        let result = classify_regime(&make_bars(&prices), Timeframe::H1).unwrap();
        assert_eq!(result.regime, MarketRegime::Volatile);
        assert_eq!(result.volatility_level, VolatilityLevel::High);
    }

    #[test]
    fn timeframe_scales_volatility() {
        let prices: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 100.0 } else { 100.5 })
            .collect();
        let bars = make_bars(&prices);
        let hourly = classify_regime(&bars, Timeframe::H1).unwrap();
        let daily = classify_regime(&bars, Timeframe::D1).unwrap();
        assert!(hourly.volatility_value > daily.volatility_value);
    }

    #[test]
    fn volatility_buckets() {
        assert_eq!(VolatilityLevel::from_value(0.0), VolatilityLevel::Low);
        assert_eq!(VolatilityLevel::from_value(0.4999), VolatilityLevel::Low);
        assert_eq!(VolatilityLevel::from_value(0.5), VolatilityLevel::Medium);
        assert_eq!(VolatilityLevel::from_value(1.4999), VolatilityLevel::Medium);
        assert_eq!(VolatilityLevel::from_value(1.5), VolatilityLevel::High);
    }

    #[test]
    fn non_positive_prices_rejected() {
        let err = classify_regime(&make_bars(&[100.0, 0.0, 100.0]), Timeframe::H1).unwrap_err();
        assert!(matches!(err, SignalbenchError::Computation { .. }));
    }
}
