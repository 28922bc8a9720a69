//! Simple Moving Average (SMA).
//!
//! Trailing population mean of close prices over a fixed window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// Callers validate `period >= 1` before constructing.
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if self.period == 0 || n < self.period {
            return result;
        }

        // Summed per window, not rolled: identical windows give bit-identical means.
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let divisor = self.period as f64;
        for (i, window) in closes.windows(self.period).enumerate() {
            result[i + self.period - 1] = window.iter().sum::<f64>() / divisor;
        }

        result
    }
}
