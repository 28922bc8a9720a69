//! Signal generation: price series in, per-bar {-1, 0, +1} recommendations out.
//!
//! Generators are pure functions of the price series and their parameters.
//! Parameter validation happens before any series work, and every generator
//! drops its own warmup bars so the frame it returns is fully defined from
//! index 0.

pub mod ma_crossover;
pub mod rsi_reversion;
pub mod state_machine;

pub use ma_crossover::MaCrossover;
pub use rsi_reversion::RsiReversion;
pub use state_machine::{RsiState, RsiThresholds};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Direction, PriceSeries};
use crate::error::EngineError;

/// Named indicator columns carried alongside the signals (e.g. `sma_10`, `rsi_14`).
pub type IndicatorColumns = BTreeMap<String, Vec<f64>>;

/// Output of a signal generator: the trimmed series and everything aligned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    /// Price series with warmup bars removed.
    pub prices: PriceSeries,
    /// One signal per bar of `prices`.
    pub signals: Vec<Direction>,
    /// Indicator values, trimmed the same way.
    pub indicators: IndicatorColumns,
    /// Number of input bars dropped before index 0.
    pub warmup: usize,
}

/// Trait for signal generators.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Number of leading bars dropped from the output.
    fn warmup_bars(&self) -> usize;

    /// Parameters, for display and reporting.
    fn params(&self) -> StrategyParams;

    /// Produce the trimmed, bar-aligned signal frame.
    ///
    /// Fails with `InvalidParameters` when the series is too short to leave
    /// at least one bar after the warmup.
    fn generate(&self, prices: &PriceSeries) -> Result<SignalFrame, EngineError>;
}

/// Strategy parameters as supplied by callers and config files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyParams {
    MaCrossover {
        short_window: usize,
        long_window: usize,
    },
    Rsi {
        period: usize,
        lower_bound: f64,
        upper_bound: f64,
        exit_buffer: f64,
    },
}

impl StrategyParams {
    /// Validate and build the matching generator.
    pub fn generator(&self) -> Result<Box<dyn SignalGenerator>, EngineError> {
        match *self {
            StrategyParams::MaCrossover {
                short_window,
                long_window,
            } => Ok(Box::new(MaCrossover::new(short_window, long_window)?)),
            StrategyParams::Rsi {
                period,
                lower_bound,
                upper_bound,
                exit_buffer,
            } => Ok(Box::new(RsiReversion::new(
                period,
                RsiThresholds::new(lower_bound, upper_bound, exit_buffer)?,
            )?)),
        }
    }

    /// Short label, e.g. `MA(10/50)` or `RSI(14, 30/70, exit 10)`.
    pub fn label(&self) -> String {
        match *self {
            StrategyParams::MaCrossover {
                short_window,
                long_window,
            } => format!("MA({short_window}/{long_window})"),
            StrategyParams::Rsi {
                period,
                lower_bound,
                upper_bound,
                exit_buffer,
            } => format!("RSI({period}, {lower_bound}/{upper_bound}, exit {exit_buffer})"),
        }
    }
}

/// Drop the first `warmup` values of an indicator column.
pub(crate) fn trim_column(values: Vec<f64>, warmup: usize) -> Vec<f64> {
    values.into_iter().skip(warmup).collect()
}

/// Trim `prices` by `warmup` bars or report that nothing would be left.
pub(crate) fn trim_prices(
    prices: &PriceSeries,
    warmup: usize,
    what: &str,
) -> Result<PriceSeries, EngineError> {
    prices.skip(warmup).ok_or_else(|| {
        EngineError::invalid(format!(
            "{what} needs more than {warmup} bars of history, series has {}",
            prices.len()
        ))
    })
}
