//! RSI mean-reversion strategy.
//!
//! Enter when RSI breaks below the oversold level, exit when it breaks above
//! the overbought level. With `mid_level_exit` set, a position held longer
//! than that many bars is also closed when RSI falls back through 50.

use serde::Serialize;
use tracing::debug;

use super::{ExitReason, Signal, SignalGenerator, StrategyId};
use crate::domain::error::SignalbenchError;
use crate::domain::indicator::rsi::{calculate_rsi, NEUTRAL_RSI};
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsiParams {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub mid_level_exit: Option<usize>,
}

impl Default for RsiParams {
    fn default() -> Self {
        RsiParams {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            mid_level_exit: None,
        }
    }
}

impl SignalGenerator for RsiParams {
    fn id(&self) -> StrategyId {
        StrategyId::RsiMeanReversion
    }

    fn label(&self) -> String {
        let base = format!("rsi_{}_{}_{}", self.period, self.oversold, self.overbought);
        match self.mid_level_exit {
            Some(bars) => format!("{base}_mid{bars}"),
            None => base,
        }
    }

    fn validate(&self) -> Result<(), SignalbenchError> {
        if self.period == 0 {
            return Err(SignalbenchError::parameter(format!(
                "period must be positive, got {}",
                self.period
            )));
        }
        if !(0.0..=100.0).contains(&self.oversold) {
            return Err(SignalbenchError::parameter(format!(
                "oversold must be between 0 and 100, got {}",
                self.oversold
            )));
        }
        if !(0.0..=100.0).contains(&self.overbought) {
            return Err(SignalbenchError::parameter(format!(
                "overbought must be between 0 and 100, got {}",
                self.overbought
            )));
        }
        if self.oversold >= self.overbought {
            return Err(SignalbenchError::parameter(format!(
                "oversold ({}) must be less than overbought ({})",
                self.oversold, self.overbought
            )));
        }
        Ok(())
    }

    fn min_bars(&self) -> usize {
        self.period + 1
    }

    fn generate(&self, bars: &[PriceBar]) -> Result<Vec<Signal>, SignalbenchError> {
        let rsi = calculate_rsi(bars, self.period)?;
        rsi.ensure_finite()?;

        let mut signals = Vec::new();
        let mut entry_index: Option<usize> = None;

        for i in 1..bars.len() {
            let (Some(cur), Some(prev)) = (rsi.value_at(i), rsi.value_at(i - 1)) else {
                continue;
            };

            match entry_index {
                None => {
                    if cur < self.oversold && prev >= self.oversold {
                        debug!(index = i, rsi = cur, "oversold breach");
                        signals.push(Signal::Enter { index: i });
                        entry_index = Some(i);
                    }
                }
                Some(entered) => {
                    if cur > self.overbought && prev <= self.overbought {
                        debug!(index = i, rsi = cur, "overbought breach");
                        signals.push(Signal::Exit {
                            index: i,
                            reason: ExitReason::Overbought,
                        });
                        entry_index = None;
                    } else if let Some(min_hold) = self.mid_level_exit {
                        if cur < NEUTRAL_RSI && prev >= NEUTRAL_RSI && i - entered > min_hold {
                            debug!(index = i, rsi = cur, "mid-level exit");
                            signals.push(Signal::Exit {
                                index: i,
                                reason: ExitReason::MidLevel,
                            });
                            entry_index = None;
                        }
                    }
                }
            }
        }

        Ok(signals)
    }
}
