//! Trade simulation: turns a signal stream into closed trades.
//!
//! Single-position state machine, Flat → InPosition on `Enter`, back to Flat on
//! `Exit`. Fills happen at the close of the signal bar. No fees, no slippage,
//! no sizing: each trade's return is the raw price ratio change. A position
//! still open when the series ends is dropped rather than force-closed.

use tracing::debug;

use super::error::SignalbenchError;
use super::ohlcv::PriceBar;
use super::position::{OpenPosition, Trade};
use super::strategy::Signal;

#[derive(Debug, Clone, PartialEq)]
enum SimState {
    Flat,
    InPosition(OpenPosition),
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    /// Position left open at the end of the series; never counted as a trade.
    pub discarded: Option<OpenPosition>,
}

/// Walk `signals` against `bars` and collect the completed trades.
///
/// Steps:
/// 1. Look up the bar for each signal (out of range is a computation error)
/// 2. `Enter` while flat opens a position at that bar's close
/// 3. `Exit` while in a position closes it and records a trade
/// 4. Redundant signals (enter while in, exit while flat) are ignored
/// 5. Whatever is still open at the end goes to `discarded`
pub fn simulate(bars: &[PriceBar], signals: &[Signal]) -> Result<SimulationResult, SignalbenchError> {
    let mut state = SimState::Flat;
    let mut trades = Vec::new();

    for signal in signals {
        let index = signal.index();
        let bar = bars.get(index).ok_or_else(|| {
            SignalbenchError::computation(format!(
                "signal at bar {index} but series has {} bars",
                bars.len()
            ))
        })?;

        state = match (state, *signal) {
            (SimState::Flat, Signal::Enter { .. }) => {
                if !bar.close.is_finite() || bar.close <= 0.0 {
                    return Err(SignalbenchError::computation(format!(
                        "cannot enter at bar {index}: price {}",
                        bar.close
                    )));
                }
                SimState::InPosition(OpenPosition {
                    entry_index: index,
                    entry_price: bar.close,
                    entry_time: bar.timestamp,
                })
            }
            (SimState::InPosition(position), Signal::Exit { reason, .. }) => {
                if index < position.entry_index {
                    return Err(SignalbenchError::computation(format!(
                        "exit at bar {index} precedes entry at bar {}",
                        position.entry_index
                    )));
                }
                trades.push(position.close(index, bar.close, bar.timestamp, reason));
                SimState::Flat
            }
            (current, ignored) => {
                debug!(index, signal = ?ignored, "ignoring redundant signal");
                current
            }
        };
    }

    let discarded = match state {
        SimState::InPosition(position) => {
            debug!(
                entry_index = position.entry_index,
                entry_price = position.entry_price,
                "discarding position still open at end of series"
            );
            Some(position)
        }
        SimState::Flat => None,
    };

    Ok(SimulationResult { trades, discarded })
}
