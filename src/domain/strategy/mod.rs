//! Strategy definitions and signal generation.
//!
//! The set of strategies is closed: [`StrategyParameters`] is a tagged variant
//! over the two supported kinds, each implementing [`SignalGenerator`].
//! Parameters are validated before any indicator is computed.

pub mod ema_crossover;
pub mod rsi_reversion;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::{ensure_valid_closes, PriceBar};

pub use ema_crossover::EmaCrossoverParams;
pub use rsi_reversion::RsiParams;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    DeathCross,
    Overbought,
    MidLevel,
}

/// Entry/exit event at a bar index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Enter { index: usize },
    Exit { index: usize, reason: ExitReason },
}

impl Signal {
    pub fn index(&self) -> usize {
        match self {
            Signal::Enter { index } | Signal::Exit { index, .. } => *index,
        }
    }
}

/// Shared contract of every strategy kind.
pub trait SignalGenerator {
    fn id(&self) -> StrategyId;

    /// Short identifier used in comparisons, e.g. `ema_9_21`.
    fn label(&self) -> String;

    fn validate(&self) -> Result<(), SignalbenchError>;

    /// Minimum number of bars the strategy needs.
    fn min_bars(&self) -> usize;

    /// Walk the series and emit signals. Assumes validated parameters and a
    /// long enough series; call [`SignalGenerator::evaluate`] instead.
    fn generate(&self, bars: &[PriceBar]) -> Result<Vec<Signal>, SignalbenchError>;

    fn evaluate(&self, bars: &[PriceBar]) -> Result<Vec<Signal>, SignalbenchError> {
        self.validate()?;
        if bars.len() < self.min_bars() {
            return Err(SignalbenchError::InsufficientData {
                what: self.label(),
                bars: bars.len(),
                minimum: self.min_bars(),
            });
        }
        ensure_valid_closes(bars)?;
        self.generate(bars)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    EmaCrossover,
    RsiMeanReversion,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::EmaCrossover => "ema_crossover",
            StrategyId::RsiMeanReversion => "rsi_mean_reversion",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = SignalbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ema_crossover" | "ema" => Ok(StrategyId::EmaCrossover),
            "rsi_mean_reversion" | "rsi" => Ok(StrategyId::RsiMeanReversion),
            other => Err(SignalbenchError::parameter(format!(
                "unknown strategy '{other}' (expected ema_crossover or rsi_mean_reversion)"
            ))),
        }
    }
}

/// Typed parameters for one strategy configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyParameters {
    EmaCrossover(EmaCrossoverParams),
    RsiMeanReversion(RsiParams),
}

impl StrategyParameters {
    pub fn default_for(id: StrategyId) -> Self {
        match id {
            StrategyId::EmaCrossover => StrategyParameters::EmaCrossover(Default::default()),
            StrategyId::RsiMeanReversion => StrategyParameters::RsiMeanReversion(Default::default()),
        }
    }

    pub fn generator(&self) -> &dyn SignalGenerator {
        match self {
            StrategyParameters::EmaCrossover(p) => p,
            StrategyParameters::RsiMeanReversion(p) => p,
        }
    }

    pub fn id(&self) -> StrategyId {
        self.generator().id()
    }

    pub fn label(&self) -> String {
        self.generator().label()
    }

    pub fn validate(&self) -> Result<(), SignalbenchError> {
        self.generator().validate()
    }

    pub fn evaluate(&self, bars: &[PriceBar]) -> Result<Vec<Signal>, SignalbenchError> {
        self.generator().evaluate(bars)
    }
}

impl fmt::Display for StrategyParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyParameters::EmaCrossover(p) => {
                write!(f, "ema_crossover({},{})", p.short_period, p.long_period)
            }
            StrategyParameters::RsiMeanReversion(p) => {
                write!(
                    f,
                    "rsi_mean_reversion({},{},{}",
                    p.period, p.oversold, p.overbought
                )?;
                if let Some(bars) = p.mid_level_exit {
                    write!(f, ",{}", bars)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Parses `ema_crossover(9,21)`, `rsi_mean_reversion(14,30,70)` or
/// `rsi_mean_reversion(14,30,70,5)`. A bare name yields the defaults.
impl FromStr for StrategyParameters {
    type Err = SignalbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, args) = match s.find('(') {
            Some(open) => {
                let inner = s[open + 1..].strip_suffix(')').ok_or_else(|| {
                    SignalbenchError::parameter(format!("missing ')' in '{s}'"))
                })?;
                let args: Vec<&str> = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .collect();
                (&s[..open], args)
            }
            None => (s, Vec::new()),
        };

        let id: StrategyId = name.parse()?;
        if args.is_empty() {
            return Ok(StrategyParameters::default_for(id));
        }

        match id {
            StrategyId::EmaCrossover => {
                if args.len() != 2 {
                    return Err(SignalbenchError::parameter(format!(
                        "ema_crossover takes 2 arguments (short,long), got {}",
                        args.len()
                    )));
                }
                Ok(StrategyParameters::EmaCrossover(EmaCrossoverParams {
                    short_period: parse_arg(args[0], "short_period")?,
                    long_period: parse_arg(args[1], "long_period")?,
                }))
            }
            StrategyId::RsiMeanReversion => {
                if !(3..=4).contains(&args.len()) {
                    return Err(SignalbenchError::parameter(format!(
                        "rsi_mean_reversion takes 3 or 4 arguments \
                         (period,oversold,overbought[,mid_exit_bars]), got {}",
                        args.len()
                    )));
                }
                let mid_level_exit = match args.get(3) {
                    Some(a) => Some(parse_arg(a, "mid_level_exit_bars")?),
                    None => None,
                };
                Ok(StrategyParameters::RsiMeanReversion(RsiParams {
                    period: parse_arg(args[0], "period")?,
                    oversold: parse_arg(args[1], "oversold")?,
                    overbought: parse_arg(args[2], "overbought")?,
                    mid_level_exit,
                }))
            }
        }
    }
}

fn parse_arg<T: FromStr>(raw: &str, name: &str) -> Result<T, SignalbenchError> {
    raw.parse()
        .map_err(|_| SignalbenchError::parameter(format!("invalid {name}: '{raw}'")))
}

/// Parses a `;`-separated list of strategy expressions.
pub fn parse_strategy_list(s: &str) -> Result<Vec<StrategyParameters>, SignalbenchError> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
