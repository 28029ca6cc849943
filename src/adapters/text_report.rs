//! Plain-text console report.
//!
//! Aligned key/value summaries plus a trade log for backtests and a ranked
//! table for comparisons.

use crate::domain::backtest::{BacktestResult, ComparisonResult, RiskReport};
use crate::domain::error::SignalbenchError;
use crate::domain::metrics::PerformanceMetrics;
use crate::domain::position::Trade;
use crate::domain::regime::RegimeClassification;
use crate::domain::risk::RiskMetrics;
use crate::ports::report_port::{Report, ReportPort};

/// Trade log rows shown before eliding the middle.
const MAX_TRADE_ROWS: usize = 20;

#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

fn header(out: &mut String, title: &str, report: &Report<'_>) {
    out.push_str(&format!(
        "=== {} | {} ({}) ===\n",
        title,
        report.market(),
        report.timeframe()
    ));
}

fn push_metrics(out: &mut String, m: &PerformanceMetrics) {
    out.push_str(&format!("Total Trades:     {}\n", m.total_trades));
    out.push_str(&format!("Win Rate:         {:.2}%\n", m.win_rate * 100.0));
    out.push_str(&format!("Total Return:     {:.2}%\n", m.total_return * 100.0));
    out.push_str(&format!("Max Drawdown:     {:.2}%\n", m.max_drawdown * 100.0));
    out.push_str(&format!("Sharpe Ratio:     {:.4}\n", m.sharpe_ratio));
}

fn push_trade_row(out: &mut String, n: usize, t: &Trade) {
    out.push_str(&format!(
        "{:>4}  {}  {}  {:>12.4}  {:>12.4}  {:>8.2}%  {:>5}  {:?}\n",
        n,
        t.entry_time.format("%Y-%m-%d %H:%M"),
        t.exit_time.format("%Y-%m-%d %H:%M"),
        t.entry_price,
        t.exit_price,
        t.trade_return * 100.0,
        t.holding_bars(),
        t.exit_reason
    ));
}

fn push_trade_log(out: &mut String, trades: &[Trade]) {
    if trades.is_empty() {
        out.push_str("\nNo completed trades.\n");
        return;
    }
    out.push_str("\nTrades:\n");
    out.push_str(
        "   #  Entry             Exit                     Entry          Exit    Return   Bars  Reason\n",
    );

    if trades.len() <= MAX_TRADE_ROWS {
        for (i, t) in trades.iter().enumerate() {
            push_trade_row(out, i + 1, t);
        }
        return;
    }

    let head = MAX_TRADE_ROWS / 2;
    let tail_start = trades.len() - head;
    for (i, t) in trades.iter().enumerate().take(head) {
        push_trade_row(out, i + 1, t);
    }
    out.push_str(&format!("   ... {} more ...\n", tail_start - head));
    for (i, t) in trades.iter().enumerate().skip(tail_start) {
        push_trade_row(out, i + 1, t);
    }
}

fn render_backtest(out: &mut String, r: &BacktestResult) {
    out.push_str(&format!("Strategy:         {}\n", r.strategy));
    out.push_str(&format!("Bars:             {}\n", r.bars));
    out.push_str(&format!("Initial Capital:  {:.2}\n", r.initial_capital));
    out.push_str(&format!("Final Capital:    {:.2}\n", r.final_capital));
    push_metrics(out, &r.metrics);
    let wins = r.trades.iter().filter(|t| t.is_win()).count();
    let losses = r.trades.iter().filter(|t| t.is_loss()).count();
    out.push_str(&format!("Wins / Losses:    {} / {}\n", wins, losses));
    if r.open_position_discarded {
        out.push_str("Note: position open at the last bar was not counted\n");
    }
    push_trade_log(out, &r.trades);
}

fn render_comparison(out: &mut String, r: &ComparisonResult) {
    let width = r
        .entries
        .iter()
        .map(|e| e.label.len())
        .chain(std::iter::once("Strategy".len()))
        .max()
        .unwrap_or(8);

    out.push_str(&format!(
        "{:<width$}  {:>6}  {:>8}  {:>10}  {:>9}  {:>8}\n",
        "Strategy", "Trades", "Win %", "Return %", "Max DD %", "Sharpe"
    ));
    for e in &r.entries {
        let m = &e.metrics;
        let marker = if e.label == r.best_strategy { " *" } else { "" };
        out.push_str(&format!(
            "{:<width$}  {:>6}  {:>8.2}  {:>10.2}  {:>9.2}  {:>8.4}{}\n",
            e.label,
            m.total_trades,
            m.win_rate * 100.0,
            m.total_return * 100.0,
            m.max_drawdown * 100.0,
            m.sharpe_ratio,
            marker
        ));
    }
    out.push_str(&format!("\nBest Strategy:    {}\n", r.best_strategy));

    if !r.failures.is_empty() {
        out.push_str("\nSkipped:\n");
        for f in &r.failures {
            out.push_str(&format!("  {}: {}\n", f.label, f.reason));
        }
    }
}

fn push_risk(out: &mut String, risk: &RiskMetrics) {
    out.push_str(&format!("Risk Level:       {}\n", risk.risk_level));
    out.push_str(&format!("Return Vol:       {:.4}\n", risk.return_volatility));
    out.push_str(&format!("Max Consec Loss:  {}\n", risk.max_consecutive_losses));
    out.push_str(&format!("Largest Loss:     {:.2}%\n", risk.largest_loss * 100.0));
    out.push_str(&format!("Avg Loss:         {:.2}%\n", risk.avg_loss * 100.0));
    out.push_str(&format!("VaR (95%):        {:.2}%\n", risk.value_at_risk_95 * 100.0));
}

fn render_risk(out: &mut String, r: &RiskReport) {
    out.push_str(&format!("Strategy:         {}\n", r.strategy));
    push_risk(out, &r.risk);
    out.push_str("\nPerformance:\n");
    push_metrics(out, &r.performance);
}

fn render_regime(out: &mut String, r: &RegimeClassification) {
    out.push_str(&format!("Regime:           {}\n", r.regime));
    out.push_str(&format!("Trend Strength:   {:.4}\n", r.trend_strength));
    out.push_str(&format!(
        "Volatility:       {} ({:.4})\n",
        r.volatility_level, r.volatility_value
    ));
    out.push_str(&format!("Price Change:     {:.2}%\n", r.price_change_pct * 100.0));
}

impl ReportPort for TextReport {
    fn render(&self, report: &Report<'_>) -> Result<String, SignalbenchError> {
        let mut out = String::new();
        match report {
            Report::Backtest { result, .. } => {
                header(&mut out, "Backtest", report);
                render_backtest(&mut out, result);
            }
            Report::Comparison { result, .. } => {
                header(&mut out, "Strategy Comparison", report);
                render_comparison(&mut out, result);
            }
            Report::Risk { result, .. } => {
                header(&mut out, "Risk Analysis", report);
                render_risk(&mut out, result);
            }
            Report::Regime { result, .. } => {
                header(&mut out, "Market Regime", report);
                render_regime(&mut out, result);
            }
        }
        Ok(out)
    }
}
