//! Optimize metric: which report field the grid search maximizes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use signallab_core::error::EngineError;

use crate::metrics::PerformanceReport;

/// Metric the optimizer maximizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMetric {
    TotalReturn,
    #[default]
    SharpeRatio,
    InformationRatio,
    /// Max drawdown; a value closer to 0 is better, so plain `>` still applies.
    Drawdown,
}

impl OptimizeMetric {
    pub const ALL: [OptimizeMetric; 4] = [
        Self::TotalReturn,
        Self::SharpeRatio,
        Self::InformationRatio,
        Self::Drawdown,
    ];

    /// Extract the relevant value from a report.
    pub fn extract(&self, report: &PerformanceReport) -> f64 {
        match self {
            Self::TotalReturn => report.total_return,
            Self::SharpeRatio => report.sharpe_ratio,
            Self::InformationRatio => report.information_ratio,
            Self::Drawdown => report.max_drawdown,
        }
    }

    /// Returns true if `a` is strictly better than `b`.
    ///
    /// Ties are not better, so the earlier cell in grid order keeps the slot.
    /// NaN is never better than anything.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        a > b
    }

    /// Display name, as shown in the metric selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TotalReturn => "Total Return",
            Self::SharpeRatio => "Sharpe Ratio",
            Self::InformationRatio => "Information Ratio",
            Self::Drawdown => "Drawdown",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalReturn => "total_return",
            Self::SharpeRatio => "sharpe_ratio",
            Self::InformationRatio => "information_ratio",
            Self::Drawdown => "drawdown",
        }
    }
}

impl fmt::Display for OptimizeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OptimizeMetric {
    type Err = EngineError;

    /// Case-insensitive; spaces, `_` and `-` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "totalreturn" | "return" => Ok(Self::TotalReturn),
            "sharperatio" | "sharpe" => Ok(Self::SharpeRatio),
            "informationratio" | "information" | "ir" => Ok(Self::InformationRatio),
            "drawdown" | "maxdrawdown" => Ok(Self::Drawdown),
            _ => Err(EngineError::UnknownMetric(s.to_string())),
        }
    }
}
