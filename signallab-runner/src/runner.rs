//! Backtest runner: wires together loader, engine, and metrics.
//!
//! Entry points:
//! - `run_backtest()`: loads prices for a config, then runs. Used by CLI.
//! - `run_backtest_on_prices()`: takes a pre-loaded series, no I/O.
//! - `run_optimization()`: loads once, then searches the configured MA grid.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use signallab_core::data::{DataError, PriceLoader};
use signallab_core::domain::PriceSeries;
use signallab_core::engine::{run_with_params, SimulationBundle, TradeEvent};
use signallab_core::error::EngineError;
use signallab_core::signals::StrategyParams;

use crate::config::{BacktestConfig, ConfigError, OptimizerConfig};
use crate::metrics::{evaluate, PerformanceReport};
use crate::optimizer::{OptimizationResult, Optimizer};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub ticker: String,
    /// Name of the loader that served the prices.
    pub source: String,
    pub strategy: StrategyParams,
    /// First and last bar of the loaded series.
    pub start_date: String,
    pub end_date: String,
    /// BLAKE3 over the loaded dates and closes.
    pub dataset_hash: String,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub report: PerformanceReport,
    pub trades: Vec<TradeEvent>,
    #[serde(skip)]
    pub bundle: SimulationBundle,
}

/// Run a backtest on a pre-loaded series.
pub fn run_backtest_on_prices(
    ticker: &str,
    source: &str,
    prices: &PriceSeries,
    params: &StrategyParams,
) -> Result<BacktestResult, RunError> {
    let bundle = run_with_params(prices, params)?;
    let report = evaluate(&bundle);
    info!(
        ticker,
        strategy = %params.label(),
        bars = prices.len(),
        total_return = report.total_return,
        sharpe = report.sharpe_ratio,
        trades = report.trade_count,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        ticker: ticker.to_string(),
        source: source.to_string(),
        strategy: *params,
        start_date: prices.first().date.to_string(),
        end_date: prices.last().date.to_string(),
        dataset_hash: prices.fingerprint(),
        bar_count: prices.len(),
        warmup_bars: bundle.warmup,
        report,
        trades: bundle.trade_events(),
        bundle,
    })
}

/// Load prices for `config` and run its strategy.
pub fn run_backtest(
    config: &BacktestConfig,
    loader: &dyn PriceLoader,
) -> Result<BacktestResult, RunError> {
    let bt = &config.backtest;
    let (prices, source) = loader.load_with_source(&bt.ticker, bt.start_date, bt.end_date)?;
    run_backtest_on_prices(&bt.ticker, &source, &prices, &config.params())
}

/// Load prices for `config` and search its optimizer grid (standard grid if
/// the section is absent).
pub fn run_optimization(
    config: &BacktestConfig,
    loader: &dyn PriceLoader,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Option<OptimizationResult>, RunError> {
    let opt = config.optimizer.clone().unwrap_or_default();
    let metric = opt.metric()?;
    let bt = &config.backtest;
    let prices = loader.load(&bt.ticker, bt.start_date, bt.end_date)?;
    Ok(optimizer_for(&opt, cancel).run(&prices, metric))
}

fn optimizer_for(opt: &OptimizerConfig, cancel: Option<Arc<AtomicBool>>) -> Optimizer {
    let optimizer = Optimizer::new(opt.grid.clone()).with_threads(opt.threads);
    match cancel {
        Some(flag) => optimizer.with_cancel(flag),
        None => optimizer,
    }
}
