//! Configuration validation.
//!
//! Checks every config field before any data is fetched. Values are read as
//! raw strings so that malformed numbers are reported instead of silently
//! replaced by defaults.

use std::str::FromStr;

use crate::domain::error::SignalbenchError;
use crate::domain::strategy::{parse_strategy_list, StrategyId};
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;

/// Read and parse an optional key. Blank values count as absent.
pub fn read_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SignalbenchError> {
    let raw = match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(None),
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| invalid(section, key, format!("cannot parse '{}'", raw.trim())))
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SignalbenchError {
    SignalbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `BASE/QUOTE`, both parts non-empty uppercase ASCII letters.
pub fn is_valid_market(market: &str) -> bool {
    let is_symbol = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase());
    match market.split_once('/') {
        Some((base, quote)) => is_symbol(base) && is_symbol(quote),
        None => false,
    }
}

pub fn validate_market(market: &str) -> Result<(), SignalbenchError> {
    if is_valid_market(market) {
        Ok(())
    } else {
        Err(invalid(
            "backtest",
            "market",
            format!("'{market}' must look like BASE/QUOTE, e.g. INJ/USDT"),
        ))
    }
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    let source = config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "synthetic".to_string());
    match source.as_str() {
        "synthetic" => {}
        "csv" => match config.get_string("data", "path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => {
                return Err(SignalbenchError::ConfigMissing {
                    section: "data".to_string(),
                    key: "path".to_string(),
                });
            }
        },
        other => {
            return Err(invalid(
                "data",
                "source",
                format!("unknown source '{other}' (expected synthetic or csv)"),
            ));
        }
    }

    read_value::<u64>(config, "data", "seed")?;
    if let Some(limit) = read_value::<usize>(config, "data", "limit")? {
        if limit == 0 {
            return Err(invalid("data", "limit", "limit must be positive"));
        }
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    match config.get_string("backtest", "market") {
        Some(m) if !m.trim().is_empty() => validate_market(m.trim())?,
        _ => {
            return Err(SignalbenchError::ConfigMissing {
                section: "backtest".to_string(),
                key: "market".to_string(),
            });
        }
    }

    if let Some(raw) = config.get_string("backtest", "timeframe") {
        raw.trim()
            .parse::<Timeframe>()
            .map_err(|reason| invalid("backtest", "timeframe", reason))?;
    }

    if let Some(capital) = read_value::<f64>(config, "backtest", "initial_capital")? {
        if !capital.is_finite() || capital <= 0.0 {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

/// Checks that every `[strategy]` key parses. Range and ordering rules
/// belong to the strategy itself and surface as `Parameter` errors from
/// `StrategyParameters::validate`.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    let id = match config.get_string("strategy", "name") {
        Some(name) if !name.trim().is_empty() => name
            .parse::<StrategyId>()
            .map_err(|e| invalid("strategy", "name", e.to_string()))?,
        _ => StrategyId::EmaCrossover,
    };

    match id {
        StrategyId::EmaCrossover => {
            read_value::<usize>(config, "strategy", "short_period")?;
            read_value::<usize>(config, "strategy", "long_period")?;
        }
        StrategyId::RsiMeanReversion => {
            read_value::<usize>(config, "strategy", "period")?;
            read_value::<f64>(config, "strategy", "oversold")?;
            read_value::<f64>(config, "strategy", "overbought")?;
            read_value::<usize>(config, "strategy", "mid_level_exit_bars")?;
        }
    }
    Ok(())
}

pub fn validate_compare_config(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    let raw = match config.get_string("compare", "strategies") {
        Some(s) => s,
        None => {
            return Err(SignalbenchError::ConfigMissing {
                section: "compare".to_string(),
                key: "strategies".to_string(),
            });
        }
    };
    let list =
        parse_strategy_list(&raw).map_err(|e| invalid("compare", "strategies", e.to_string()))?;
    if list.is_empty() {
        return Err(invalid("compare", "strategies", "no strategies listed"));
    }
    Ok(())
}
