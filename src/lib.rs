//! signalbench: technical-analysis strategy backtester.
//!
//! Hexagonal architecture: pure computation in [`domain`], port traits for the
//! data/config/report collaborators in [`ports`], concrete implementations in
//! [`adapters`], and the command surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
