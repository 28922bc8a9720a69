//! Synthetic random-walk loader for development and offline demos.
//!
//! The walk is seeded from the BLAKE3 hash of the upper-cased ticker, so a
//! ticker always produces the same path. Bars are generated from a fixed
//! anchor date and then range-filtered, so overlapping requests agree on
//! every shared date. Weekends are skipped.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{finish_series, DataError, PriceLoader};
use crate::domain::{Bar, PriceSeries};

/// Loader that fabricates a deterministic daily random walk.
#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    anchor: NaiveDate,
    start_price: f64,
    max_daily_move: f64,
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        Self {
            anchor: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN),
            start_price: 100.0,
            max_daily_move: 0.03,
        }
    }
}

impl SyntheticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn seed(ticker: &str) -> [u8; 32] {
        *blake3::hash(ticker.to_uppercase().as_bytes()).as_bytes()
    }

    /// Walk from the anchor through `end`.
    fn walk(&self, ticker: &str, end: NaiveDate) -> Vec<Bar> {
        let mut rng = StdRng::from_seed(Self::seed(ticker));
        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = self.anchor;

        while current <= end {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                let daily_return: f64 = rng.gen_range(-self.max_daily_move..self.max_daily_move);
                price *= 1.0 + daily_return;
                bars.push(Bar::new(current, price));
            }
            current += chrono::Duration::days(1);
        }
        bars
    }
}

impl PriceLoader for SyntheticLoader {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if start > end {
            return Err(DataError::unavailable(
                ticker,
                format!("start {start} is after end {end}"),
            ));
        }
        finish_series(ticker, self.walk(ticker, end), start, end)
    }
}
