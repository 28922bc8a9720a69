//! In-memory loader for tests and embedding callers.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::{finish_series, DataError, PriceLoader};
use crate::domain::PriceSeries;

/// Serves pre-built series keyed by upper-cased ticker.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    series: HashMap<String, PriceSeries>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.insert(ticker, series);
        self
    }

    pub fn insert(&mut self, ticker: &str, series: PriceSeries) {
        self.series.insert(ticker.to_uppercase(), series);
    }
}

impl PriceLoader for MemoryLoader {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let series = self
            .series
            .get(&ticker.to_uppercase())
            .ok_or_else(|| DataError::unavailable(ticker, "ticker not loaded"))?;
        finish_series(ticker, series.bars().to_vec(), start, end)
    }
}
