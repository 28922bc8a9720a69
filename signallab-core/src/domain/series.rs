//! PriceSeries: validated, ordered daily closes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Bar;
use crate::error::DataError;

/// Ordered sequence of daily bars, length ≥ 1.
///
/// Invariants (checked on construction):
/// - at least one bar
/// - dates strictly increasing (no duplicates)
/// - every close finite and > 0
///
/// The engine never mutates a series; trimming and range selection return new
/// series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, DataError> {
        if bars.is_empty() {
            return Err(DataError::InvalidSeries("series has no bars".into()));
        }
        if let Some(bad) = bars.iter().find(|b| !b.is_sane()) {
            return Err(DataError::InvalidSeries(format!(
                "close on {} must be finite and positive, got {}",
                bad.date, bad.close
            )));
        }
        if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(DataError::InvalidSeries(format!(
                "dates must be strictly increasing: {} follows {}",
                w[1].date, w[0].date
            )));
        }
        Ok(Self { bars })
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self, DataError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::new(start + chrono::Duration::days(i as i64), close))
            .collect();
        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: a constructed series holds at least one bar.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    /// Drop the first `n` bars, re-basing the index to 0.
    ///
    /// Returns `None` if nothing would remain.
    pub fn skip(&self, n: usize) -> Option<Self> {
        if n >= self.bars.len() {
            return None;
        }
        Some(Self {
            bars: self.bars[n..].to_vec(),
        })
    }

    /// Bars with `start <= date <= end`, or `None` if the range is empty.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Option<Self> {
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .copied()
            .collect();
        if bars.is_empty() {
            None
        } else {
            Some(Self { bars })
        }
    }

    /// Deterministic BLAKE3 hash over dates and closes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.close.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = DataError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<Bar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}
