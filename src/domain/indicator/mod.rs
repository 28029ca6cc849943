//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: a single point in an indicator series, flagged invalid
//!   while the lookback window is still filling
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a series aligned index-for-index with the price bars

pub mod ema;
pub mod rsi;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::error::SignalbenchError;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, or `None` if out of range or still warming up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }

    /// Fails if the series produced no usable values or any valid value is
    /// not finite.
    pub fn ensure_finite(&self) -> Result<(), SignalbenchError> {
        if self.valid_count() == 0 {
            return Err(SignalbenchError::computation(format!(
                "{} produced no valid values",
                self.indicator_type
            )));
        }
        if let Some((i, p)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, p)| p.valid && !p.value.is_finite())
        {
            return Err(SignalbenchError::computation(format!(
                "{} is {} at bar {}",
                self.indicator_type, p.value, i
            )));
        }
        Ok(())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
