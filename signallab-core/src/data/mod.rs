//! Price loaders: everything that turns (ticker, date range) into a `PriceSeries`.
//!
//! The `PriceLoader` trait abstracts over sources (CSV directory, Yahoo
//! Finance, in-memory fixtures, synthetic random walks) so the runner can
//! swap them and tests can mock them. `FallbackLoader` chains loaders.

pub mod csv;
pub mod fallback;
pub mod memory;
pub mod synthetic;
pub mod yahoo;

pub use self::csv::CsvLoader;
pub use fallback::FallbackLoader;
pub use memory::MemoryLoader;
pub use synthetic::SyntheticLoader;
pub use yahoo::YahooLoader;

pub use crate::error::DataError;

use chrono::NaiveDate;

use crate::domain::{Bar, PriceSeries};

/// Trait for price sources.
///
/// Implementations return only bars with `start <= date <= end` and fail
/// with `DataUnavailable` when the ticker is unknown or the range is empty.
pub trait PriceLoader: Send + Sync {
    /// Human-readable name of this loader.
    fn name(&self) -> &str;

    /// Load daily closes for `ticker` over the inclusive range.
    fn load(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries, DataError>;

    /// Load and report which loader actually served the bars. Composite
    /// loaders override this to name the link that succeeded.
    fn load_with_source(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(PriceSeries, String), DataError> {
        let series = self.load(ticker, start, end)?;
        Ok((series, self.name().to_string()))
    }
}

impl<L: PriceLoader + ?Sized> PriceLoader for Box<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        (**self).load(ticker, start, end)
    }

    fn load_with_source(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(PriceSeries, String), DataError> {
        (**self).load_with_source(ticker, start, end)
    }
}

/// Sort, range-filter and validate raw bars from any source.
///
/// Duplicate dates keep the last occurrence.
pub(crate) fn finish_series(
    ticker: &str,
    mut bars: Vec<Bar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, DataError> {
    if start > end {
        return Err(DataError::unavailable(
            ticker,
            format!("start {start} is after end {end}"),
        ));
    }
    bars.retain(|b| b.date >= start && b.date <= end);
    bars.sort_by_key(|b| b.date);
    // dedup_by keeps the first of a run; reverse so the later row wins
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();

    if bars.is_empty() {
        return Err(DataError::unavailable(
            ticker,
            format!("no bars between {start} and {end}"),
        ));
    }
    PriceSeries::new(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn finish_sorts_filters_and_dedups() {
        let bars = vec![
            Bar::new(d(1, 5), 3.0),
            Bar::new(d(1, 2), 1.0),
            Bar::new(d(1, 3), 2.0),
            Bar::new(d(1, 3), 2.5),
            Bar::new(d(2, 1), 9.0),
        ];
        let s = finish_series("X", bars, d(1, 1), d(1, 31)).unwrap();
        assert_eq!(s.closes(), vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn finish_empty_range_is_unavailable() {
        let bars = vec![Bar::new(d(1, 2), 1.0)];
        let err = finish_series("X", bars, d(3, 1), d(3, 31)).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn finish_inverted_range_is_unavailable() {
        let err = finish_series("X", vec![], d(3, 1), d(1, 1)).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }
}
