//! SignalLab Runner: evaluation, optimization and orchestration.
//!
//! This crate builds on `signallab-core` to provide:
//! - Performance evaluation (return, Sharpe, volatility, drawdown, information ratio, trades)
//! - Optimize-metric selection and the parallel MA grid search
//! - TOML configuration and loader selection with CSV/Yahoo/synthetic fallback
//! - Single-backtest runner and CSV/JSON export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod fitness;
pub mod metrics;
pub mod optimizer;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, DataSource, StrategyConfig};
pub use data_loader::build_loader;
pub use export::{export_bundle_csv, export_report_json, save_artifacts};
pub use fitness::OptimizeMetric;
pub use metrics::{evaluate, PerformanceReport, ReportMetric};
pub use optimizer::{optimize_ma, MaGrid, OptimizationResult, Optimizer};
pub use runner::{run_backtest, run_backtest_on_prices, run_optimization, BacktestResult, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<PerformanceReport>();
        assert_sync::<PerformanceReport>();
        assert_send::<OptimizeMetric>();
        assert_sync::<OptimizeMetric>();
    }

    #[test]
    fn optimizer_types_are_send_sync() {
        assert_send::<Optimizer>();
        assert_sync::<Optimizer>();
        assert_send::<OptimizationResult>();
        assert_sync::<OptimizationResult>();
        assert_send::<MaGrid>();
        assert_sync::<MaGrid>();
    }

    #[test]
    fn runner_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
