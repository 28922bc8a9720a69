//! Relative Strength Index (RSI) over simple returns.
//!
//! r[t] = close[t]/close[t-1] - 1 with r[0] = 0.
//! gain = max(r, 0), loss = max(-r, 0), both averaged with a trailing
//! simple mean over `period` bars.
//! RSI = 100 - 100 / (1 + mean_gain / mean_loss)
//! Lookback: period - 1 (r[0] counts as a zero return).
//! Edge case: mean_loss == 0 → RSI = 100, including the flat window.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    /// Callers validate `period >= 1` before constructing.
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
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

        let returns = simple_returns(bars);
        let gains: Vec<f64> = returns.iter().map(|r| r.max(0.0)).collect();
        let losses: Vec<f64> = returns.iter().map(|r| (-r).max(0.0)).collect();

        let divisor = self.period as f64;
        for end in (self.period - 1)..n {
            let start = end + 1 - self.period;
            let mean_gain = gains[start..=end].iter().sum::<f64>() / divisor;
            let mean_loss = losses[start..=end].iter().sum::<f64>() / divisor;
            result[end] = rsi_from_means(mean_gain, mean_loss);
        }

        result
    }
}

/// Simple returns with r[0] = 0.
pub fn simple_returns(bars: &[Bar]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return returns;
    }
    returns.push(0.0);
    returns.extend(bars.windows(2).map(|w| w[1].close / w[0].close - 1.0));
    returns
}

/// RSI from window means.
///
/// A window without losses has an unbounded relative strength and is pinned
/// to 100 (fully overbought) instead of dividing by zero.
pub fn rsi_from_means(mean_gain: f64, mean_loss: f64) -> f64 {
    if mean_loss == 0.0 {
        return 100.0;
    }
    let rs = mean_gain / mean_loss;
    100.0 - 100.0 / (1.0 + rs)
}
