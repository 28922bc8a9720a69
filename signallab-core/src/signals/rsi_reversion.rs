//! RSI mean-reversion signal with exit hysteresis.
//!
//! Buys oversold readings, sells overbought ones, and holds each position
//! until the RSI retreats past a more moderate exit level. The entry/exit
//! logic is the sequential state machine in `state_machine`; this module only
//! computes readings and records states.

use super::state_machine::{walk, RsiThresholds};
use super::{trim_column, trim_prices, SignalFrame, SignalGenerator, StrategyParams};
use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::indicators::{Indicator, Rsi};

/// RSI mean-reversion signal generator.
///
/// # Indicator columns
/// - `rsi_{period}`
#[derive(Debug, Clone)]
pub struct RsiReversion {
    rsi: Rsi,
    thresholds: RsiThresholds,
}

impl RsiReversion {
    pub fn new(period: usize, thresholds: RsiThresholds) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::invalid("RSI period must be >= 1"));
        }
        Ok(Self {
            rsi: Rsi::new(period),
            thresholds,
        })
    }

    /// Period 14, bounds 30/70, exit buffer 10.
    pub fn default_params() -> Result<Self, EngineError> {
        Self::new(14, RsiThresholds::new(30.0, 70.0, 10.0)?)
    }

    pub fn period(&self) -> usize {
        self.rsi.period()
    }

    pub fn thresholds(&self) -> &RsiThresholds {
        &self.thresholds
    }
}

impl SignalGenerator for RsiReversion {
    fn name(&self) -> &str {
        "rsi_reversion"
    }

    fn warmup_bars(&self) -> usize {
        self.rsi.lookback()
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::Rsi {
            period: self.period(),
            lower_bound: self.thresholds.lower(),
            upper_bound: self.thresholds.upper(),
            exit_buffer: self.thresholds.exit_buffer(),
        }
    }

    fn generate(&self, prices: &PriceSeries) -> Result<SignalFrame, EngineError> {
        let warmup = self.warmup_bars();
        let trimmed = trim_prices(prices, warmup, "RSI period")?;

        let readings = trim_column(self.rsi.compute(prices.bars()), warmup);
        let signals = walk(&readings, &self.thresholds)
            .into_iter()
            .map(|state| state.direction())
            .collect();

        let mut indicators = super::IndicatorColumns::new();
        indicators.insert(self.rsi.name().to_string(), readings);

        Ok(SignalFrame {
            prices: trimmed,
            signals,
            indicators,
            warmup,
        })
    }
}
