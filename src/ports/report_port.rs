//! Report rendering port trait.

use serde::Serialize;
use std::path::Path;

use crate::domain::backtest::{BacktestResult, ComparisonResult, RiskReport};
use crate::domain::error::SignalbenchError;
use crate::domain::regime::RegimeClassification;
use crate::domain::timeframe::Timeframe;

/// One finished result plus the market it was computed for.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report<'a> {
    Backtest {
        market: &'a str,
        timeframe: Timeframe,
        result: &'a BacktestResult,
    },
    Comparison {
        market: &'a str,
        timeframe: Timeframe,
        result: &'a ComparisonResult,
    },
    Risk {
        market: &'a str,
        timeframe: Timeframe,
        result: &'a RiskReport,
    },
    Regime {
        market: &'a str,
        timeframe: Timeframe,
        result: &'a RegimeClassification,
    },
}

impl Report<'_> {
    pub fn market(&self) -> &str {
        match self {
            Report::Backtest { market, .. }
            | Report::Comparison { market, .. }
            | Report::Risk { market, .. }
            | Report::Regime { market, .. } => market,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        match self {
            Report::Backtest { timeframe, .. }
            | Report::Comparison { timeframe, .. }
            | Report::Risk { timeframe, .. }
            | Report::Regime { timeframe, .. } => *timeframe,
        }
    }
}

/// Port for turning results into text.
pub trait ReportPort {
    fn render(&self, report: &Report<'_>) -> Result<String, SignalbenchError>;

    /// Default implementation: render, then write the text to `output_path`.
    fn write(&self, report: &Report<'_>, output_path: &Path) -> Result<(), SignalbenchError> {
        let text = self.render(report)?;
        std::fs::write(output_path, text)?;
        Ok(())
    }
}
