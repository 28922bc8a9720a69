//! Loader chain: try each loader in order, first success wins.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{DataError, PriceLoader};
use crate::domain::PriceSeries;

/// Ordered chain of loaders.
///
/// `InvalidSeries` from any link stops the chain: bad data is never papered
/// over by a later source. `DataUnavailable` moves on to the next link.
pub struct FallbackLoader {
    chain: Vec<Box<dyn PriceLoader>>,
}

impl FallbackLoader {
    pub fn new(chain: Vec<Box<dyn PriceLoader>>) -> Self {
        Self { chain }
    }

    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|l| l.name()).collect()
    }
}

impl PriceLoader for FallbackLoader {
    fn name(&self) -> &str {
        "fallback"
    }

    fn load(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        self.load_with_source(ticker, start, end).map(|(series, _)| series)
    }

    /// Reports the link that served the bars, never "fallback" itself.
    fn load_with_source(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(PriceSeries, String), DataError> {
        let mut reasons = Vec::new();
        for (i, loader) in self.chain.iter().enumerate() {
            debug!(ticker, loader = loader.name(), "loader attempt");
            match loader.load_with_source(ticker, start, end) {
                Ok((series, source)) => {
                    if i > 0 {
                        warn!(
                            ticker,
                            loader = loader.name(),
                            skipped = %reasons.join("; "),
                            "using fallback data source"
                        );
                    }
                    return Ok((series, source));
                }
                Err(DataError::DataUnavailable { reason, .. }) => {
                    reasons.push(format!("{}: {reason}", loader.name()));
                }
                Err(e) => return Err(e),
            }
        }
        Err(DataError::unavailable(
            ticker,
            if reasons.is_empty() {
                "no loaders configured".to_string()
            } else {
                reasons.join("; ")
            },
        ))
    }
}
