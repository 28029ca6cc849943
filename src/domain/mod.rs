//! Core domain types and logic.
//!
//! Data flows one way: price bars → indicators → signals → trades → metrics →
//! classification labels. Nothing in here performs I/O.

pub mod ohlcv;
pub mod timeframe;
pub mod indicator;
pub mod strategy;
pub mod position;
pub mod execution;
pub mod stats;
pub mod metrics;
pub mod regime;
pub mod risk;
pub mod backtest;
pub mod config_validation;
pub mod error;
