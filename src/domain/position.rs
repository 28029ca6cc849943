//! Open positions and closed trades.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::strategy::ExitReason;

/// A long position waiting for its exit signal.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
}

/// A completed entry/exit pair. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_index: usize,
    pub exit_price: f64,
    pub exit_time: NaiveDateTime,
    /// (exit_price - entry_price) / entry_price
    #[serde(rename = "return")]
    pub trade_return: f64,
    pub exit_reason: ExitReason,
}

impl OpenPosition {
    /// Close this position at the given bar, producing the finished trade.
    pub fn close(
        self,
        exit_index: usize,
        exit_price: f64,
        exit_time: NaiveDateTime,
        exit_reason: ExitReason,
    ) -> Trade {
        let trade_return = (exit_price - self.entry_price) / self.entry_price;
        Trade {
            entry_index: self.entry_index,
            entry_price: self.entry_price,
            entry_time: self.entry_time,
            exit_index,
            exit_price,
            exit_time,
            trade_return,
            exit_reason,
        }
    }
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.trade_return > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.trade_return < 0.0
    }

    pub fn holding_bars(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

pub fn trade_returns(trades: &[Trade]) -> Vec<f64> {
    trades.iter().map(|t| t.trade_return).collect()
}
