//! EMA crossover strategy: golden cross entry, death cross exit.
//!
//! Enter when the short EMA crosses from <= long to > long while flat.
//! Exit when the short EMA crosses from >= long to < long while in a position.

use serde::Serialize;
use tracing::debug;

use super::{ExitReason, Signal, SignalGenerator, StrategyId};
use crate::domain::error::SignalbenchError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmaCrossoverParams {
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for EmaCrossoverParams {
    fn default() -> Self {
        EmaCrossoverParams {
            short_period: 9,
            long_period: 21,
        }
    }
}

impl SignalGenerator for EmaCrossoverParams {
    fn id(&self) -> StrategyId {
        StrategyId::EmaCrossover
    }

    fn label(&self) -> String {
        format!("ema_{}_{}", self.short_period, self.long_period)
    }

    fn validate(&self) -> Result<(), SignalbenchError> {
        if self.short_period == 0 {
            return Err(SignalbenchError::parameter(format!(
                "short_period must be positive, got {}",
                self.short_period
            )));
        }
        if self.long_period == 0 {
            return Err(SignalbenchError::parameter(format!(
                "long_period must be positive, got {}",
                self.long_period
            )));
        }
        if self.short_period >= self.long_period {
            return Err(SignalbenchError::parameter(format!(
                "short_period ({}) must be less than long_period ({})",
                self.short_period, self.long_period
            )));
        }
        Ok(())
    }

    fn min_bars(&self) -> usize {
        self.long_period
    }

    fn generate(&self, bars: &[PriceBar]) -> Result<Vec<Signal>, SignalbenchError> {
        let short = calculate_ema(bars, self.short_period)?;
        let long = calculate_ema(bars, self.long_period)?;
        short.ensure_finite()?;
        long.ensure_finite()?;

        let mut signals = Vec::new();
        let mut in_position = false;

        for i in 1..bars.len() {
            let (Some(short_cur), Some(long_cur), Some(short_prev), Some(long_prev)) = (
                short.value_at(i),
                long.value_at(i),
                short.value_at(i - 1),
                long.value_at(i - 1),
            ) else {
                continue;
            };

            if !in_position && short_cur > long_cur && short_prev <= long_prev {
                debug!(index = i, price = bars[i].close, "golden cross");
                signals.push(Signal::Enter { index: i });
                in_position = true;
            } else if in_position && short_cur < long_cur && short_prev >= long_prev {
                debug!(index = i, price = bars[i].close, "death cross");
                signals.push(Signal::Exit {
                    index: i,
                    reason: ExitReason::DeathCross,
                });
                in_position = false;
            }
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn params(short: usize, long: usize) -> EmaCrossoverParams {
        EmaCrossoverParams {
            short_period: short,
            long_period: long,
        }
    }

    /// Flat, then a rally, then a selloff: one golden cross, one death cross.
    fn rally_then_selloff() -> Vec<f64> {
        let mut prices = vec![100.0; 30];
        prices.extend((1..=15).map(|i| 100.0 + i as f64));
        prices.extend((1..=25).map(|i| 115.0 - i as f64));
        prices
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(EmaCrossoverParams::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_not_less_than_long() {
        assert!(params(21, 9).validate().is_err());
        assert!(params(9, 9).validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_periods() {
        assert!(params(0, 9).validate().is_err());
        assert!(params(3, 0).validate().is_err());
    }

    #[test]
    fn invalid_params_fail_before_data_checks() {
        // Too little data AND bad params: the parameter error wins.
        let bars = make_bars(&[1.0, 2.0]);
        let err = params(21, 9).evaluate(&bars).unwrap_err();
        assert!(matches!(err, SignalbenchError::Parameter { .. }));
    }

    #[test]
    fn insufficient_data() {
        let bars = make_bars(&[100.0; 20]);
        let err = params(9, 21).evaluate(&bars).unwrap_err();
        assert!(matches!(
            err,
            SignalbenchError::InsufficientData {
                bars: 20,
                minimum: 21,
                ..
            }
        ));
    }

    #[test]
    fn constant_prices_no_signals() {
        let bars = make_bars(&[100.0; 500]);
        let signals = params(9, 21).evaluate(&bars).unwrap();
        assert!(signals.is_empty());
    }

    #[test]
    fn golden_then_death_cross() {
        let bars = make_bars(&rally_then_selloff());
        let signals = params(3, 8).evaluate(&bars).unwrap();

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0], Signal::Enter { index: 30 });
        assert!(matches!(
            signals[1],
            Signal::Exit {
                reason: ExitReason::DeathCross,
                ..
            }
        ));
        assert!(signals[1].index() > 45);
    }

    #[test]
    fn rising_series_enters_at_most_once() {
        let mut prices = vec![50.0; 25];
        prices.extend((1..=100).map(|i| 50.0 + i as f64 * 0.5));
        let signals = params(9, 21).evaluate(&make_bars(&prices)).unwrap();

        let enters = signals
            .iter()
            .filter(|s| matches!(s, Signal::Enter { .. }))
            .count();
        let exits = signals.len() - enters;
        assert_eq!(enters, 1);
        assert_eq!(exits, 0);
    }

    #[test]
    fn signals_alternate_enter_exit() {
        // Oscillating series produces several round trips.
        let prices: Vec<f64> = (0..300)
            .map(|i| 100.0 + 10.0 * (i as f64 / 12.0).sin())
            .collect();
        let signals = params(3, 10).evaluate(&make_bars(&prices)).unwrap();

        assert!(signals.len() >= 4);
        for (n, s) in signals.iter().enumerate() {
            if n % 2 == 0 {
                assert!(matches!(s, Signal::Enter { .. }), "signal {n} should be Enter");
            } else {
                assert!(matches!(s, Signal::Exit { .. }), "signal {n} should be Exit");
            }
        }
    }

    #[test]
    fn label() {
        assert_eq!(params(9, 21).label(), "ema_9_21");
    }
}
