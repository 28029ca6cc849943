//! Backtest entry points: single run, comparison, risk analysis.
//!
//! Each call is a pure pass over its own price series:
//! bars → signals → trades → metrics. Nothing is cached between calls.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use super::error::SignalbenchError;
use super::execution::simulate;
use super::metrics::PerformanceMetrics;
use super::ohlcv::PriceBar;
use super::position::Trade;
use super::risk::RiskMetrics;
use super::strategy::StrategyParameters;
use super::timeframe::Timeframe;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub market: String,
    pub timeframe: Timeframe,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub label: String,
    pub bars: usize,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    /// True when a position was still open at the last bar and was dropped.
    pub open_position_discarded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub label: String,
    pub strategy: String,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonFailure {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub entries: Vec<ComparisonEntry>,
    pub best_strategy: String,
    pub failures: Vec<ComparisonFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub strategy: String,
    pub label: String,
    pub risk: RiskMetrics,
    pub performance: PerformanceMetrics,
}

fn simulate_strategy(
    bars: &[PriceBar],
    params: &StrategyParameters,
) -> Result<(Vec<Trade>, bool), SignalbenchError> {
    let signals = params.evaluate(bars)?;
    let result = simulate(bars, &signals)?;
    info!(
        strategy = %params.label(),
        bars = bars.len(),
        signals = signals.len(),
        trades = result.trades.len(),
        "strategy simulated"
    );
    Ok((result.trades, result.discarded.is_some()))
}

/// Run one strategy over the series.
///
/// `final_capital` compounds the initial capital through every closed trade;
/// the metrics themselves do not depend on capital.
pub fn run_backtest(
    bars: &[PriceBar],
    params: &StrategyParameters,
    initial_capital: f64,
) -> Result<BacktestResult, SignalbenchError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(SignalbenchError::parameter(format!(
            "initial_capital must be positive, got {initial_capital}"
        )));
    }

    let (trades, open_position_discarded) = simulate_strategy(bars, params)?;
    let metrics = PerformanceMetrics::compute(&trades);
    let final_capital = trades
        .iter()
        .fold(initial_capital, |capital, t| capital * (1.0 + t.trade_return));

    Ok(BacktestResult {
        strategy: params.to_string(),
        label: params.label(),
        bars: bars.len(),
        initial_capital,
        final_capital,
        metrics,
        trades,
        open_position_discarded,
    })
}

/// Run every configuration against the same series and pick the best.
///
/// A failing configuration is recorded and skipped; the rest still run.
/// A configuration whose label repeats an earlier one is skipped the same way,
/// so every entry label is unique.
pub fn compare_strategies(
    bars: &[PriceBar],
    configs: &[StrategyParameters],
) -> Result<ComparisonResult, SignalbenchError> {
    if configs.is_empty() {
        return Err(SignalbenchError::parameter(
            "at least one strategy is required for comparison",
        ));
    }

    let mut entries = Vec::with_capacity(configs.len());
    let mut failures = Vec::new();
    let mut seen = HashSet::with_capacity(configs.len());

    for params in configs {
        let label = params.label();
        if !seen.insert(label.clone()) {
            warn!(strategy = %label, "skipping repeated strategy in comparison");
            failures.push(ComparisonFailure {
                label,
                reason: "duplicate of an earlier configuration".to_string(),
            });
            continue;
        }
        match simulate_strategy(bars, params) {
            Ok((trades, _)) => entries.push(ComparisonEntry {
                label,
                strategy: params.to_string(),
                metrics: PerformanceMetrics::compute(&trades),
            }),
            Err(e) => {
                warn!(strategy = %label, error = %e, "skipping strategy in comparison");
                failures.push(ComparisonFailure {
                    label,
                    reason: e.to_string(),
                });
            }
        }
    }

    let best_strategy = match select_best(&entries) {
        Some(best) => best.label.clone(),
        None => {
            return Err(SignalbenchError::computation(format!(
                "all {} strategies failed",
                configs.len()
            )));
        }
    };

    Ok(ComparisonResult {
        entries,
        best_strategy,
        failures,
    })
}

/// Highest Sharpe ratio, ties broken by total return, remaining ties by
/// input order.
pub fn select_best(entries: &[ComparisonEntry]) -> Option<&ComparisonEntry> {
    entries.iter().fold(None, |best, entry| match best {
        None => Some(entry),
        Some(current) => {
            let a = &entry.metrics;
            let b = &current.metrics;
            let better = a.sharpe_ratio > b.sharpe_ratio
                || (a.sharpe_ratio == b.sharpe_ratio && a.total_return > b.total_return);
            if better { Some(entry) } else { Some(current) }
        }
    })
}

/// Backtest one strategy and profile the risk of its trades.
pub fn analyze_risk(
    bars: &[PriceBar],
    params: &StrategyParameters,
) -> Result<RiskReport, SignalbenchError> {
    let (trades, _) = simulate_strategy(bars, params)?;
    Ok(RiskReport {
        strategy: params.to_string(),
        label: params.label(),
        risk: RiskMetrics::analyze(&trades),
        performance: PerformanceMetrics::compute(&trades),
    })
}
