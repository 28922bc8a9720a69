//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily close for a single symbol on a single day.
///
/// The engine only ever reads the close; open/high/low are not part of the
/// backtest model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// Returns true if the close is finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 103.0)
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_rejects_non_positive_close() {
        let mut bar = sample_bar();
        bar.close = 0.0;
        assert!(!bar.is_sane());
        bar.close = -1.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_nan_close() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_sane());
    }
}
