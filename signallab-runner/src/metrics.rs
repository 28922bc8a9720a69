//! Performance metrics: pure functions over a simulation bundle.
//!
//! Every statistic except `trade_count` is computed over the daily percentage
//! change of the strategy growth curve, `d[t] = S[t]/S[t-1] - 1` for t ≥ 1.
//! Degenerate inputs (zero variance, fewer than two changes) yield NaN in the
//! report rather than an error.

use serde::{Deserialize, Serialize};
use signallab_core::engine::SimulationBundle;
use signallab_core::error::EngineError;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate performance statistics for one backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub annualized_volatility: f64,
    pub max_drawdown: f64,
    pub information_ratio: f64,
    pub trade_count: usize,
}

/// A single field of `PerformanceReport`, for callers that need a defined number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMetric {
    TotalReturn,
    SharpeRatio,
    AnnualizedVolatility,
    MaxDrawdown,
    InformationRatio,
}

impl ReportMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalReturn => "total_return",
            Self::SharpeRatio => "sharpe_ratio",
            Self::AnnualizedVolatility => "annualized_volatility",
            Self::MaxDrawdown => "max_drawdown",
            Self::InformationRatio => "information_ratio",
        }
    }
}

impl PerformanceReport {
    /// Evaluate a bundle.
    pub fn compute(bundle: &SimulationBundle) -> Self {
        let d = daily_returns(&bundle.strategy_returns);
        let benchmark = bundle.returns.get(1..).unwrap_or_default();
        Self {
            total_return: total_return(&bundle.strategy_returns),
            sharpe_ratio: sharpe_ratio(&d),
            annualized_volatility: annualized_volatility(&d),
            max_drawdown: max_drawdown(&bundle.strategy_returns),
            information_ratio: information_ratio(&d, benchmark),
            trade_count: trade_count(&bundle.trades),
        }
    }

    /// Raw field value, NaN included.
    pub fn get(&self, metric: ReportMetric) -> f64 {
        match metric {
            ReportMetric::TotalReturn => self.total_return,
            ReportMetric::SharpeRatio => self.sharpe_ratio,
            ReportMetric::AnnualizedVolatility => self.annualized_volatility,
            ReportMetric::MaxDrawdown => self.max_drawdown,
            ReportMetric::InformationRatio => self.information_ratio,
        }
    }

    /// Field value, or `UndefinedMetric` when it is NaN.
    pub fn value(&self, metric: ReportMetric) -> Result<f64, EngineError> {
        let v = self.get(metric);
        if v.is_nan() {
            Err(EngineError::UndefinedMetric {
                metric: metric.as_str(),
            })
        } else {
            Ok(v)
        }
    }
}

/// `evaluate(bundle) -> PerformanceReport`.
pub fn evaluate(bundle: &SimulationBundle) -> PerformanceReport {
    PerformanceReport::compute(bundle)
}

// ─── Individual metric functions ────────────────────────────────────

/// `S[last]/S[0] - 1`; 0 for an empty curve.
pub fn total_return(growth: &[f64]) -> f64 {
    match (growth.first(), growth.last()) {
        (Some(&first), Some(&last)) => last / first - 1.0,
        _ => 0.0,
    }
}

/// Annualized Sharpe ratio with a zero risk-free rate.
pub fn sharpe_ratio(daily: &[f64]) -> f64 {
    let std = std_dev(daily);
    if std.is_nan() || std == 0.0 {
        return f64::NAN;
    }
    mean_f64(daily) / std * TRADING_DAYS_PER_YEAR.sqrt()
}

pub fn annualized_volatility(daily: &[f64]) -> f64 {
    std_dev(daily) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Most negative `(S - peak) / peak` over the curve, floored at -1.
///
/// A short position can drive the growth curve below zero; the loss is then
/// total and reported as -1.
pub fn max_drawdown(growth: &[f64]) -> f64 {
    let Some(&first) = growth.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &level in growth {
        if level > peak {
            peak = level;
        }
        if peak > 0.0 {
            let dd = (level - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd.max(-1.0)
}

/// `mean(d - r) / stdev(d - r)` over aligned daily strategy and benchmark
/// returns. Not annualized.
pub fn information_ratio(daily: &[f64], benchmark_daily: &[f64]) -> f64 {
    let active: Vec<f64> = daily
        .iter()
        .zip(benchmark_daily)
        .map(|(d, r)| d - r)
        .collect();
    let std = std_dev(&active);
    if std.is_nan() || std == 0.0 {
        return f64::NAN;
    }
    mean_f64(&active) / std
}

/// Bars t ≥ 1 where a trade follows a bar without one.
pub fn trade_count(trades: &[i8]) -> usize {
    trades
        .windows(2)
        .filter(|w| w[1] != 0 && w[0] == 0)
        .count()
}

/// Percentage change of a growth curve, one shorter than its input.
///
/// A zero level has no defined change; the next bar contributes 0.
pub fn daily_returns(growth: &[f64]) -> Vec<f64> {
    growth
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1); NaN with fewer than two values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use signallab_core::domain::PriceSeries;
    use signallab_core::engine::run_ma_strategy;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), closes).unwrap()
    }

    // ── Total return ──

    #[test]
    fn total_return_reconstructs_final_level() {
        assert!((total_return(&[1.0, 1.1, 1.21]) - 0.21).abs() < 1e-12);
        assert_eq!(total_return(&[1.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    // ── Sharpe / volatility ──

    #[test]
    fn sharpe_known_value() {
        let d = [0.01, 0.02, 0.03];
        // mean 0.02, sample std 0.01
        assert!((sharpe_ratio(&d) - 2.0 * 252f64.sqrt()).abs() < 1e-9);
        assert!((annualized_volatility(&d) - 0.01 * 252f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sharpe_zero_variance_is_nan() {
        assert!(sharpe_ratio(&[0.01; 10]).is_nan());
        assert!(sharpe_ratio(&[0.01]).is_nan());
        assert!(sharpe_ratio(&[]).is_nan());
    }

    #[test]
    fn volatility_single_change_is_nan() {
        assert!(annualized_volatility(&[0.05]).is_nan());
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known() {
        let eq = [1.0, 1.1, 0.9, 0.95];
        let expected = (0.9 - 1.1) / 1.1;
        assert!((max_drawdown(&eq) - expected).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_divides_by_peak_not_trough() {
        // peak 110, trough 102
        let eq = [1.00, 1.02, 1.01, 1.05, 1.10, 1.08, 1.07, 1.02];
        let dd = max_drawdown(&eq);
        assert!((dd - (1.02 - 1.10) / 1.10).abs() < 1e-12);
        assert!((dd - (1.02 - 1.10) / 1.02).abs() > 1e-3);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        let eq: Vec<f64> = (0..100).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert_eq!(max_drawdown(&eq), 0.0);
        assert_eq!(max_drawdown(&[1.0; 5]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_floors_at_total_loss() {
        assert_eq!(max_drawdown(&[1.0, 1.5, -0.2]), -1.0);
    }

    // ── Information ratio ──

    #[test]
    fn information_ratio_of_active_returns() {
        let d = [0.02, 0.00, 0.04];
        let r = [0.01, 0.01, 0.01];
        // active = [0.01, -0.01, 0.03]: mean 0.01, sample std 0.02
        assert!((information_ratio(&d, &r) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn information_ratio_tracking_benchmark_is_nan() {
        let d = [0.01, -0.02, 0.03];
        assert!(information_ratio(&d, &d).is_nan());
    }

    // ── Trade count ──

    #[test]
    fn trade_count_counts_entries_after_quiet_bars() {
        assert_eq!(trade_count(&[0, 1, 0, 0, -2, 0, 1]), 3);
        assert_eq!(trade_count(&[0, 2, -2, 2]), 1);
        assert_eq!(trade_count(&[0]), 0);
        assert_eq!(trade_count(&[]), 0);
    }

    // ── Report ──

    #[test]
    fn scenario_report() {
        let b = run_ma_strategy(
            &series(&[100.0, 102.0, 101.0, 105.0, 110.0, 108.0, 107.0, 112.0]),
            2,
            4,
        )
        .unwrap();
        let r = evaluate(&b);
        assert!((r.total_return - (102.0 / 105.0 - 1.0)).abs() < 1e-12);
        assert!((r.max_drawdown - (102.0 - 110.0) / 110.0).abs() < 1e-12);
        assert_eq!(r.trade_count, 1);
        assert!(r.sharpe_ratio.is_finite());
        assert!(r.information_ratio.is_finite());
    }

    #[test]
    fn constant_price_report() {
        let b = run_ma_strategy(&series(&[50.0; 30]), 3, 10).unwrap();
        let r = evaluate(&b);
        assert_eq!(r.total_return, 0.0);
        assert_eq!(r.trade_count, 0);
        assert_eq!(r.max_drawdown, 0.0);
        assert!(r.sharpe_ratio.is_nan());
        assert_eq!(
            r.value(ReportMetric::SharpeRatio),
            Err(EngineError::UndefinedMetric {
                metric: "sharpe_ratio"
            })
        );
        assert_eq!(r.value(ReportMetric::TotalReturn), Ok(0.0));
    }

    #[test]
    fn single_bar_bundle_is_all_nan_statistics() {
        let b = run_ma_strategy(&series(&[1.0, 2.0, 3.0, 4.0]), 2, 4).unwrap();
        let r = evaluate(&b);
        assert_eq!(r.total_return, 0.0);
        assert!(r.sharpe_ratio.is_nan());
        assert!(r.annualized_volatility.is_nan());
        assert!(r.information_ratio.is_nan());
    }

    #[test]
    fn report_serializes_nan_as_null() {
        let b = run_ma_strategy(&series(&[50.0; 30]), 3, 10).unwrap();
        let json = serde_json::to_value(evaluate(&b)).unwrap();
        assert!(json["sharpe_ratio"].is_null());
        assert_eq!(json["trade_count"], 0);
    }
}
