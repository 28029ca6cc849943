//! Risk profile of a completed trade sequence.

use serde::Serialize;
use std::fmt;

use super::position::{trade_returns, Trade};
use super::stats::{mean, percentile_linear, population_std, round4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Score of 0-2 is Low, 3-4 Medium, 5 and up High.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => RiskLevel::Low,
            3..=4 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub return_volatility: f64,
    pub max_consecutive_losses: usize,
    pub largest_loss: f64,
    pub avg_loss: f64,
    pub value_at_risk_95: f64,
    pub risk_level: RiskLevel,
}

impl RiskMetrics {
    pub fn analyze(trades: &[Trade]) -> Self {
        Self::from_returns(&trade_returns(trades))
    }

    pub fn from_returns(returns: &[f64]) -> Self {
        let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();

        let return_volatility = population_std(returns);
        let max_consecutive_losses = max_consecutive_losses(returns);
        let largest_loss = losses.iter().copied().fold(0.0, f64::min);
        let avg_loss = mean(&losses);
        let value_at_risk_95 = if returns.len() < 2 {
            0.0
        } else {
            percentile_linear(returns, 5.0)
        };

        let score = risk_score(return_volatility, max_consecutive_losses, largest_loss);

        RiskMetrics {
            return_volatility: round4(return_volatility),
            max_consecutive_losses,
            largest_loss: round4(largest_loss),
            avg_loss: round4(avg_loss),
            value_at_risk_95: round4(value_at_risk_95),
            risk_level: RiskLevel::from_score(score),
        }
    }
}

fn max_consecutive_losses(returns: &[f64]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for r in returns {
        if *r < 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Each factor adds 2 above its high threshold or 1 above its moderate one.
fn risk_score(volatility: f64, consecutive_losses: usize, largest_loss: f64) -> u32 {
    let mut score = 0;

    if volatility > 0.15 {
        score += 2;
    } else if volatility > 0.08 {
        score += 1;
    }

    if consecutive_losses > 5 {
        score += 2;
    } else if consecutive_losses > 3 {
        score += 1;
    }

    if largest_loss < -0.15 {
        score += 2;
    } else if largest_loss < -0.08 {
        score += 1;
    }

    score
}
