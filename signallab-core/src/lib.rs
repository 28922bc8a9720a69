//! SignalLab Core: domain types, indicators, signal generators, simulator, loaders.
//!
//! This crate contains the single-asset backtesting engine:
//! - Validated price series and per-bar position directions
//! - SMA and RSI indicators with NaN warmup
//! - Moving-average crossover and RSI mean-reversion signal generators
//! - A simulator that lags signals into positions and compounds growth curves
//! - Price loaders (CSV, Yahoo Finance, in-memory, synthetic) behind one trait
//!
//! Performance evaluation, the parameter optimizer and configuration live in
//! `signallab-runner`.

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signals;

pub use engine::{run_ma_strategy, run_rsi_strategy, run_strategy, SimulationBundle};
pub use error::{DataError, EngineError};
