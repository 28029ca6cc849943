//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReport;
use crate::adapters::synthetic_adapter::{SyntheticAdapter, DEFAULT_SEED};
use crate::adapters::text_report::TextReport;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use crate::domain::config_validation::{
    read_value, validate_backtest_config, validate_compare_config, validate_data_config,
    validate_strategy_config,
};
use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::regime::classify_regime;
use crate::domain::strategy::{
    parse_strategy_list, EmaCrossoverParams, RsiParams, StrategyId, StrategyParameters,
};
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{Report, ReportPort};

/// Bars fetched when `[data] limit` is not set.
pub const DEFAULT_LIMIT: usize = 500;

#[derive(Parser, Debug)]
#[command(
    name = "signalbench",
    about = "Backtest EMA crossover and RSI mean-reversion strategies"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the price series comes from. Flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Market symbol, e.g. INJ/USDT
    #[arg(short, long)]
    pub market: Option<String>,
    /// 1m, 5m, 15m, 1h, 4h or 1d
    #[arg(short, long)]
    pub timeframe: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one strategy
    Backtest {
        #[command(flatten)]
        input: InputArgs,
        /// Strategy expression, e.g. "ema_crossover(9,21)"
        #[arg(short, long)]
        strategy: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run several strategies on the same series and rank them
    Compare {
        #[command(flatten)]
        input: InputArgs,
        /// `;`-separated strategy expressions
        #[arg(long)]
        strategies: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Risk profile of one strategy's trades
    Risk {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long)]
        strategy: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Classify the market regime of the series
    Regime {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List markets available from the configured data source
    ListMarkets {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        timeframe: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            input,
            strategy,
            output,
        } => run_backtest(&input, strategy.as_deref(), &output),
        Command::Compare {
            input,
            strategies,
            output,
        } => run_compare(&input, strategies.as_deref(), &output),
        Command::Risk {
            input,
            strategy,
            output,
        } => run_risk(&input, strategy.as_deref(), &output),
        Command::Regime { input, output } => run_regime(&input, &output),
        Command::Validate { config } => run_validate(&config),
        Command::ListMarkets { config, timeframe } => {
            run_list_markets(config.as_ref(), timeframe.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, SignalbenchError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Load the config, apply flag overrides, and validate data/backtest sections.
fn load_input(input: &InputArgs) -> Result<FileConfigAdapter, SignalbenchError> {
    let mut config = load_config(input.config.as_ref())?;
    if let Some(market) = &input.market {
        config.set("backtest", "market", market);
    }
    if let Some(timeframe) = &input.timeframe {
        config.set("backtest", "timeframe", timeframe);
    }
    validate_data_config(&config)?;
    validate_backtest_config(&config)?;
    Ok(config)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SignalbenchError> {
    let market = config
        .get_string("backtest", "market")
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| SignalbenchError::ConfigMissing {
            section: "backtest".into(),
            key: "market".into(),
        })?;

    Ok(BacktestConfig {
        market,
        timeframe: read_value(config, "backtest", "timeframe")?.unwrap_or(Timeframe::H1),
        initial_capital: read_value(config, "backtest", "initial_capital")?
            .unwrap_or(DEFAULT_INITIAL_CAPITAL),
    })
}

/// Strategy from the `[strategy]` section, defaults filling absent keys.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<StrategyParameters, SignalbenchError> {
    let id = read_value(config, "strategy", "name")?.unwrap_or(StrategyId::EmaCrossover);

    let params = match id {
        StrategyId::EmaCrossover => {
            let defaults = EmaCrossoverParams::default();
            StrategyParameters::EmaCrossover(EmaCrossoverParams {
                short_period: read_value(config, "strategy", "short_period")?
                    .unwrap_or(defaults.short_period),
                long_period: read_value(config, "strategy", "long_period")?
                    .unwrap_or(defaults.long_period),
            })
        }
        StrategyId::RsiMeanReversion => {
            let defaults = RsiParams::default();
            StrategyParameters::RsiMeanReversion(RsiParams {
                period: read_value(config, "strategy", "period")?.unwrap_or(defaults.period),
                oversold: read_value(config, "strategy", "oversold")?.unwrap_or(defaults.oversold),
                overbought: read_value(config, "strategy", "overbought")?
                    .unwrap_or(defaults.overbought),
                mid_level_exit: read_value(config, "strategy", "mid_level_exit_bars")?,
            })
        }
    };
    Ok(params)
}

/// `--strategy` wins over the config file.
fn resolve_strategy(
    config: &dyn ConfigPort,
    expression: Option<&str>,
) -> Result<StrategyParameters, SignalbenchError> {
    match expression {
        Some(expr) => {
            let params: StrategyParameters = expr.parse()?;
            params.validate()?;
            Ok(params)
        }
        None => {
            validate_strategy_config(config)?;
            let params = build_strategy(config)?;
            params.validate()?;
            Ok(params)
        }
    }
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, SignalbenchError> {
    let source = config.get_string_or("data", "source", "synthetic").to_lowercase();
    match source.as_str() {
        "csv" => {
            let path = config
                .get_string("data", "path")
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .ok_or_else(|| SignalbenchError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(path))))
        }
        "synthetic" => {
            let seed = read_value(config, "data", "seed")?.unwrap_or(DEFAULT_SEED);
            Ok(Box::new(SyntheticAdapter::new(seed)))
        }
        other => Err(SignalbenchError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{other}' (expected synthetic or csv)"),
        }),
    }
}

fn fetch_bars(
    config: &dyn ConfigPort,
    bt_config: &BacktestConfig,
) -> Result<Vec<PriceBar>, SignalbenchError> {
    let data_port = build_data_port(config)?;
    let limit = read_value(config, "data", "limit")?.unwrap_or(DEFAULT_LIMIT);
    let bars = data_port.fetch_candles(&bt_config.market, bt_config.timeframe, limit)?;
    info!(
        market = %bt_config.market,
        timeframe = %bt_config.timeframe,
        bars = bars.len(),
        "price series loaded"
    );
    Ok(bars)
}

fn emit(report: &Report<'_>, output: &OutputArgs) -> Result<(), SignalbenchError> {
    let reporter: Box<dyn ReportPort> = match output.format {
        OutputFormat::Text => Box::new(TextReport),
        OutputFormat::Json => Box::new(JsonReport),
    };
    match &output.output {
        Some(path) => {
            reporter.write(report, path)?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{}", reporter.render(report)?),
    }
    Ok(())
}

fn run_backtest(
    input: &InputArgs,
    strategy: Option<&str>,
    output: &OutputArgs,
) -> Result<(), SignalbenchError> {
    // Validate everything before fetching data
    let config = load_input(input)?;
    let params = resolve_strategy(&config, strategy)?;
    let bt_config = build_backtest_config(&config)?;

    eprintln!(
        "Backtesting {} on {} ({})",
        params, bt_config.market, bt_config.timeframe
    );
    let bars = fetch_bars(&config, &bt_config)?;
    let result = backtest_engine::run_backtest(&bars, &params, bt_config.initial_capital)?;

    emit(
        &Report::Backtest {
            market: &bt_config.market,
            timeframe: bt_config.timeframe,
            result: &result,
        },
        output,
    )
}

fn run_compare(
    input: &InputArgs,
    strategies: Option<&str>,
    output: &OutputArgs,
) -> Result<(), SignalbenchError> {
    let mut config = load_input(input)?;
    if let Some(list) = strategies {
        config.set("compare", "strategies", list);
    }
    validate_compare_config(&config)?;
    let configs = parse_strategy_list(&config.get_string_or("compare", "strategies", ""))?;
    let bt_config = build_backtest_config(&config)?;

    eprintln!(
        "Comparing {} strategies on {} ({})",
        configs.len(),
        bt_config.market,
        bt_config.timeframe
    );
    let bars = fetch_bars(&config, &bt_config)?;
    let result = backtest_engine::compare_strategies(&bars, &configs)?;

    emit(
        &Report::Comparison {
            market: &bt_config.market,
            timeframe: bt_config.timeframe,
            result: &result,
        },
        output,
    )
}

fn run_risk(
    input: &InputArgs,
    strategy: Option<&str>,
    output: &OutputArgs,
) -> Result<(), SignalbenchError> {
    let config = load_input(input)?;
    let params = resolve_strategy(&config, strategy)?;
    let bt_config = build_backtest_config(&config)?;

    eprintln!(
        "Analyzing risk of {} on {} ({})",
        params, bt_config.market, bt_config.timeframe
    );
    let bars = fetch_bars(&config, &bt_config)?;
    let result = backtest_engine::analyze_risk(&bars, &params)?;

    emit(
        &Report::Risk {
            market: &bt_config.market,
            timeframe: bt_config.timeframe,
            result: &result,
        },
        output,
    )
}

fn run_regime(input: &InputArgs, output: &OutputArgs) -> Result<(), SignalbenchError> {
    let config = load_input(input)?;
    let bt_config = build_backtest_config(&config)?;

    let bars = fetch_bars(&config, &bt_config)?;
    let result = classify_regime(&bars, bt_config.timeframe)?;

    emit(
        &Report::Regime {
            market: &bt_config.market,
            timeframe: bt_config.timeframe,
            result: &result,
        },
        output,
    )
}

fn run_validate(config_path: &Path) -> Result<(), SignalbenchError> {
    let config = FileConfigAdapter::from_file(config_path)?;

    validate_data_config(&config)?;
    validate_backtest_config(&config)?;
    validate_strategy_config(&config)?;
    let params = build_strategy(&config)?;
    params.validate()?;

    let bt_config = build_backtest_config(&config)?;
    println!("Market:           {}", bt_config.market);
    println!("Timeframe:        {}", bt_config.timeframe);
    println!("Initial Capital:  {:.2}", bt_config.initial_capital);
    println!("Strategy:         {}", params);

    if config.get_string("compare", "strategies").is_some() {
        validate_compare_config(&config)?;
        let list = parse_strategy_list(&config.get_string_or("compare", "strategies", ""))?;
        println!("Compare:");
        for p in &list {
            match p.validate() {
                Ok(()) => println!("  {}", p),
                Err(e) => println!("  {} (will be skipped: {})", p, e),
            }
        }
    }

    eprintln!("Configuration is valid");
    Ok(())
}

fn run_list_markets(
    config_path: Option<&PathBuf>,
    timeframe: Option<&str>,
) -> Result<(), SignalbenchError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;

    let timeframe = match timeframe {
        Some(raw) => raw.parse::<Timeframe>().map_err(|reason| {
            SignalbenchError::ConfigInvalid {
                section: "backtest".into(),
                key: "timeframe".into(),
                reason,
            }
        })?,
        None => read_value(&config, "backtest", "timeframe")?.unwrap_or(Timeframe::H1),
    };

    let markets = build_data_port(&config)?.list_markets(timeframe)?;
    if markets.is_empty() {
        eprintln!("No markets found for timeframe {}", timeframe);
    } else {
        for market in &markets {
            println!("{}", market);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn backtest_config_defaults() {
        let bt = build_backtest_config(&config("[backtest]\nmarket = INJ/USDT\n")).unwrap();
        assert_eq!(bt.market, "INJ/USDT");
        assert_eq!(bt.timeframe, Timeframe::H1);
        assert_eq!(bt.initial_capital, DEFAULT_INITIAL_CAPITAL);
    }

    #[test]
    fn backtest_config_requires_market() {
        let err = build_backtest_config(&config("[backtest]\ntimeframe = 4h\n")).unwrap_err();
        assert!(matches!(err, SignalbenchError::ConfigMissing { .. }));
    }

    #[test]
    fn build_strategy_defaults_to_ema() {
        let params = build_strategy(&config("[backtest]\nmarket = INJ/USDT\n")).unwrap();
        assert_eq!(params, StrategyParameters::EmaCrossover(EmaCrossoverParams::default()));
    }

    #[test]
    fn build_strategy_reads_rsi_keys() {
        let params = build_strategy(&config(
            "[strategy]\nname = rsi_mean_reversion\nperiod = 10\noversold = 25\n\
             overbought = 75\nmid_level_exit_bars = 4\n",
        ))
        .unwrap();
        assert_eq!(
            params,
            StrategyParameters::RsiMeanReversion(RsiParams {
                period: 10,
                oversold: 25.0,
                overbought: 75.0,
                mid_level_exit: Some(4),
            })
        );
    }

    #[test]
    fn strategy_flag_overrides_config() {
        let cfg = config("[strategy]\nname = rsi_mean_reversion\n");
        let params = resolve_strategy(&cfg, Some("ema_crossover(5,20)")).unwrap();
        assert_eq!(params.label(), "ema_5_20");
    }

    #[test]
    fn inverted_periods_fail_the_same_from_file_or_flag() {
        let cfg = config("[strategy]\nshort_period = 21\nlong_period = 9\n");
        let from_file = resolve_strategy(&cfg, None).unwrap_err();
        let from_flag =
            resolve_strategy(&FileConfigAdapter::empty(), Some("ema_crossover(21,9)")).unwrap_err();
        assert!(matches!(from_file, SignalbenchError::Parameter { .. }));
        assert!(matches!(from_flag, SignalbenchError::Parameter { .. }));
    }

    #[test]
    fn invalid_strategy_flag_is_parameter_error() {
        let err = resolve_strategy(&FileConfigAdapter::empty(), Some("ema_crossover(21,9)"))
            .unwrap_err();
        assert!(matches!(err, SignalbenchError::Parameter { .. }));
    }

    #[test]
    fn input_flags_override_file() {
        let input = InputArgs {
            config: None,
            market: Some("BTC/USDT".to_string()),
            timeframe: Some("4h".to_string()),
        };
        let cfg = load_input(&input).unwrap();
        let bt = build_backtest_config(&cfg).unwrap();
        assert_eq!(bt.market, "BTC/USDT");
        assert_eq!(bt.timeframe, Timeframe::H4);
    }

    #[test]
    fn bad_market_flag_rejected() {
        let input = InputArgs {
            market: Some("inj-usdt".to_string()),
            ..Default::default()
        };
        let err = load_input(&input).unwrap_err();
        assert!(matches!(err, SignalbenchError::ConfigInvalid { .. }));
    }

    #[test]
    fn data_port_defaults_to_synthetic() {
        let port = build_data_port(&FileConfigAdapter::empty()).unwrap();
        let bars = port.fetch_candles("INJ/USDT", Timeframe::H1, 10).unwrap();
        assert_eq!(bars.len(), 10);
    }

    #[test]
    fn cli_parses_backtest_flags() {
        let cli = Cli::parse_from([
            "signalbench",
            "backtest",
            "--market",
            "INJ/USDT",
            "--strategy",
            "rsi_mean_reversion(14,30,70)",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Backtest {
                input,
                strategy,
                output,
            } => {
                assert_eq!(input.market.as_deref(), Some("INJ/USDT"));
                assert_eq!(strategy.as_deref(), Some("rsi_mean_reversion(14,30,70)"));
                assert_eq!(output.format, OutputFormat::Json);
                assert!(output.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
