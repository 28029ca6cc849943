//! Performance metrics over a sequence of closed trades.
//!
//! Everything is trade-level: the equity curve starts at 1.0 and compounds
//! each trade's return in order. Values are rounded to 4 decimals.

use serde::Serialize;

use super::position::{trade_returns, Trade};
use super::stats::{mean, population_std, round4};

/// Standard deviations at or below this count as zero for Sharpe.
const MIN_STDDEV: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub win_rate: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub total_trades: usize,
}

impl PerformanceMetrics {
    pub fn compute(trades: &[Trade]) -> Self {
        Self::from_returns(&trade_returns(trades))
    }

    pub fn from_returns(returns: &[f64]) -> Self {
        let total_trades = returns.len();

        let wins = returns.iter().filter(|&&r| r > 0.0).count();
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64
        } else {
            0.0
        };

        let total_return = returns.iter().fold(1.0, |equity, r| equity * (1.0 + r)) - 1.0;

        PerformanceMetrics {
            win_rate: round4(win_rate),
            total_return: round4(total_return),
            max_drawdown: round4(compute_drawdown(returns)),
            sharpe_ratio: round4(compute_sharpe(returns)),
            total_trades,
        }
    }

    /// Neutral metrics for a run with no trades.
    pub fn empty() -> Self {
        Self::from_returns(&[])
    }
}

/// Largest peak-to-trough decline of the compounded equity curve, as a
/// positive fraction of the peak.
fn compute_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = equity;
    let mut max_dd = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let stddev = population_std(returns);
    if stddev <= MIN_STDDEV {
        return 0.0;
    }
    mean(returns) / stddev
}
