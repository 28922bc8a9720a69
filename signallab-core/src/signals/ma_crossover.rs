//! Moving average crossover signal.
//!
//! Long (+1) while the short SMA is strictly above the long SMA, Short (-1)
//! otherwise. Always in the market once both averages exist; stateless and
//! computed for the whole series at once.

use super::{trim_column, trim_prices, SignalFrame, SignalGenerator, StrategyParams};
use crate::domain::{Direction, PriceSeries};
use crate::error::EngineError;
use crate::indicators::{Indicator, Sma};

/// Moving average crossover signal generator.
///
/// # Indicator columns
/// - `sma_{short_window}`
/// - `sma_{long_window}`
#[derive(Debug, Clone)]
pub struct MaCrossover {
    short: Sma,
    long: Sma,
}

impl MaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, EngineError> {
        if short_window == 0 {
            return Err(EngineError::invalid("short_window must be >= 1"));
        }
        if short_window >= long_window {
            return Err(EngineError::invalid(format!(
                "short_window ({short_window}) must be less than long_window ({long_window})"
            )));
        }
        Ok(Self {
            short: Sma::new(short_window),
            long: Sma::new(long_window),
        })
    }

    pub fn default_params() -> Result<Self, EngineError> {
        Self::new(10, 50)
    }

    pub fn short_window(&self) -> usize {
        self.short.period()
    }

    pub fn long_window(&self) -> usize {
        self.long.period()
    }
}

impl SignalGenerator for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn warmup_bars(&self) -> usize {
        self.long.lookback()
    }

    fn params(&self) -> StrategyParams {
        StrategyParams::MaCrossover {
            short_window: self.short_window(),
            long_window: self.long_window(),
        }
    }

    fn generate(&self, prices: &PriceSeries) -> Result<SignalFrame, EngineError> {
        let warmup = self.warmup_bars();
        let trimmed = trim_prices(prices, warmup, "long moving average")?;

        let short_ma = trim_column(self.short.compute(prices.bars()), warmup);
        let long_ma = trim_column(self.long.compute(prices.bars()), warmup);

        let signals = short_ma
            .iter()
            .zip(&long_ma)
            .map(|(s, l)| if s > l { Direction::Long } else { Direction::Short })
            .collect();

        let mut indicators = super::IndicatorColumns::new();
        indicators.insert(self.short.name().to_string(), short_ma);
        indicators.insert(self.long.name().to_string(), long_ma);

        Ok(SignalFrame {
            prices: trimmed,
            signals,
            indicators,
            warmup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), closes).unwrap()
    }

    #[test]
    fn rejects_short_not_below_long() {
        assert!(matches!(
            MaCrossover::new(20, 20),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(MaCrossover::new(30, 20).is_err());
    }

    #[test]
    fn rejects_zero_window() {
        assert!(MaCrossover::new(0, 5).is_err());
    }

    #[test]
    fn rejects_long_window_beyond_history() {
        let s = series(&[1.0, 2.0, 3.0]);
        let g = MaCrossover::new(2, 4).unwrap();
        assert!(matches!(
            g.generate(&s),
            Err(EngineError::InvalidParameters(_))
        ));
    }

    #[test]
    fn long_window_equal_to_history_leaves_one_bar() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        let frame = MaCrossover::new(2, 4).unwrap().generate(&s).unwrap();
        assert_eq!(frame.prices.len(), 1);
        assert_eq!(frame.signals, vec![Direction::Long]);
    }

    #[test]
    fn known_scenario() {
        let s = series(&[100.0, 102.0, 101.0, 105.0, 110.0, 108.0, 107.0, 112.0]);
        let frame = MaCrossover::new(2, 4).unwrap().generate(&s).unwrap();

        assert_eq!(frame.warmup, 3);
        assert_eq!(frame.prices.len(), 5);
        assert_eq!(frame.prices.first().close, 105.0);
        assert_eq!(frame.indicators["sma_4"][0], 102.0);
        assert_eq!(frame.indicators["sma_2"][0], 103.0);
        assert_eq!(
            frame.signals,
            vec![
                Direction::Long,  // 103 > 102
                Direction::Long,  // 107.5 > 104.5
                Direction::Long,  // 109 > 106
                Direction::Short, // 107.5 == 107.5
                Direction::Long,  // 109.5 > 109.25
            ]
        );
    }

    #[test]
    fn trimmed_length_matches_long_window() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64).sin()).collect();
        let s = series(&closes);
        let frame = MaCrossover::new(5, 20).unwrap().generate(&s).unwrap();
        assert_eq!(frame.prices.len(), 60 - 19);
        assert_eq!(frame.signals.len(), frame.prices.len());
        for col in frame.indicators.values() {
            assert_eq!(col.len(), frame.prices.len());
            assert!(col.iter().all(|v| !v.is_nan()));
        }
    }

    #[test]
    fn flat_market_is_short() {
        let s = series(&[42.0; 10]);
        let frame = MaCrossover::new(2, 5).unwrap().generate(&s).unwrap();
        assert!(frame.signals.iter().all(|d| *d == Direction::Short));
    }
}
