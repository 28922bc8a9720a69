//! Backtest engine: entry points that run generator → simulator.
//!
//! The engine holds no state between calls. Every entry point takes the price
//! series by reference, derives new series from it, and hands the caller an
//! owned `SimulationBundle`.

pub mod bundle;
pub mod simulator;

pub use bundle::{SimulationBundle, TradeEvent, TradeKind};
pub use simulator::simulate;

use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::signals::{MaCrossover, RsiReversion, RsiThresholds, SignalGenerator, StrategyParams};

/// Run any signal generator through the simulator.
pub fn run_strategy(
    prices: &PriceSeries,
    generator: &dyn SignalGenerator,
) -> Result<SimulationBundle, EngineError> {
    let frame = generator.generate(prices)?;
    Ok(simulate(frame, generator.params()))
}

/// Validate `params`, build the generator, and run it.
pub fn run_with_params(
    prices: &PriceSeries,
    params: &StrategyParams,
) -> Result<SimulationBundle, EngineError> {
    let generator = params.generator()?;
    run_strategy(prices, generator.as_ref())
}

/// Moving-average crossover backtest.
pub fn run_ma_strategy(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<SimulationBundle, EngineError> {
    let generator = MaCrossover::new(short_window, long_window)?;
    run_strategy(prices, &generator)
}

/// RSI mean-reversion backtest.
pub fn run_rsi_strategy(
    prices: &PriceSeries,
    period: usize,
    lower_bound: f64,
    upper_bound: f64,
    exit_buffer: f64,
) -> Result<SimulationBundle, EngineError> {
    let thresholds = RsiThresholds::new(lower_bound, upper_bound, exit_buffer)?;
    let generator = RsiReversion::new(period, thresholds)?;
    run_strategy(prices, &generator)
}
