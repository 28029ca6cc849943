//! Price bar representation.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::SignalbenchError;

/// One OHLCV candle. Only `close` feeds the core; the rest is carried through
/// from the data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar with every price field set to `close`.
    pub fn from_close(timestamp: NaiveDateTime, close: f64) -> Self {
        PriceBar {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Reject series the core cannot compute over: non-finite or non-positive
/// closes would poison every downstream ratio.
pub fn ensure_valid_closes(bars: &[PriceBar]) -> Result<(), SignalbenchError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(SignalbenchError::computation(format!(
                "close price at bar {} is {} (must be finite and positive)",
                i, bar.close
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn from_close_fills_ohlc() {
        let bar = PriceBar::from_close(ts(0), 12.5);
        assert_eq!(bar.open, 12.5);
        assert_eq!(bar.high, 12.5);
        assert_eq!(bar.low, 12.5);
        assert_eq!(bar.close, 12.5);
    }

    #[test]
    fn closes_in_order() {
        let bars = vec![PriceBar::from_close(ts(0), 1.0), PriceBar::from_close(ts(1), 2.0)];
        assert_eq!(closes(&bars), vec![1.0, 2.0]);
    }

    #[test]
    fn valid_closes_pass() {
        let bars = vec![PriceBar::from_close(ts(0), 1.0), PriceBar::from_close(ts(1), 2.0)];
        assert!(ensure_valid_closes(&bars).is_ok());
    }

    #[test]
    fn nan_close_is_computation_error() {
        let bars = vec![PriceBar::from_close(ts(0), 1.0), PriceBar::from_close(ts(1), f64::NAN)];
        let err = ensure_valid_closes(&bars).unwrap_err();
        assert!(matches!(err, SignalbenchError::Computation { .. }));
    }

    #[test]
    fn zero_close_is_computation_error() {
        let bars = vec![PriceBar::from_close(ts(0), 0.0)];
        assert!(ensure_valid_closes(&bars).is_err());
    }
}
