//! Error taxonomy shared by the engine, the loaders and the runner.

use thiserror::Error;

/// Errors raised while producing a price series.
///
/// Displayable in CLI output as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    /// The ticker is unknown to the source, the source is unreachable, or the
    /// requested range holds zero bars.
    #[error("data unavailable for '{ticker}': {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// Bars were found but violate the series invariants (ordering, positive closes).
    #[error("invalid price series: {0}")]
    InvalidSeries(String),
}

impl DataError {
    pub fn unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the engine entry points and the optimizer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Bad window or threshold combination, caught before any series work.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A statistic is degenerate (zero variance, too few samples).
    ///
    /// Reports carry these as NaN; this variant is only produced when a caller
    /// explicitly asks for a defined value.
    #[error("metric '{metric}' is undefined for this run")]
    UndefinedMetric { metric: &'static str },

    /// The optimizer was given a metric name outside the supported set.
    #[error("unknown metric '{0}' (expected one of: total_return, sharpe_ratio, information_ratio, drawdown)")]
    UnknownMetric(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}
