//! Exhaustive MA parameter search.
//!
//! Every `(short, long)` cell of the grid is an independent backtest over the
//! same read-only price series, so cells fan out on rayon. Scores are
//! collected in grid order and reduced by a single writer after fan-in: the
//! winner is the first cell with the strictly greatest metric, whatever order
//! the workers finished in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use signallab_core::data::PriceLoader;
use signallab_core::domain::PriceSeries;
use signallab_core::engine::run_ma_strategy;
use signallab_core::error::EngineError;

use crate::fitness::OptimizeMetric;
use crate::metrics::evaluate;

/// Short and long window candidates. Cells are enumerated short-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaGrid {
    #[serde(default = "standard_short_windows")]
    pub short_windows: Vec<usize>,
    #[serde(default = "standard_long_windows")]
    pub long_windows: Vec<usize>,
}

fn standard_short_windows() -> Vec<usize> {
    vec![3, 5, 7, 10, 15, 20, 25, 30]
}

fn standard_long_windows() -> Vec<usize> {
    vec![30, 40, 50, 60, 70, 80, 90, 100, 120, 150, 200]
}

impl Default for MaGrid {
    fn default() -> Self {
        Self::standard()
    }
}

impl MaGrid {
    pub fn new(short_windows: Vec<usize>, long_windows: Vec<usize>) -> Self {
        Self {
            short_windows,
            long_windows,
        }
    }

    /// Short 3–30, long 30–200.
    pub fn standard() -> Self {
        Self {
            short_windows: standard_short_windows(),
            long_windows: standard_long_windows(),
        }
    }

    /// All pairs in grid order, invalid ones included.
    pub fn cells(&self) -> Vec<(usize, usize)> {
        self.short_windows
            .iter()
            .flat_map(|&s| self.long_windows.iter().map(move |&l| (s, l)))
            .collect()
    }

    pub fn size(&self) -> usize {
        self.short_windows.len() * self.long_windows.len()
    }
}

/// What happened to one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CellOutcome {
    /// Backtest ran; `value` may be NaN for a degenerate statistic.
    Scored { value: f64 },
    /// Parameters rejected (short ≥ long, or longer than the series).
    Skipped { reason: String },
    /// Not started before cancellation.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellScore {
    pub short_window: usize,
    pub long_window: usize,
    #[serde(flatten)]
    pub outcome: CellOutcome,
}

impl CellScore {
    /// Defined score, if any.
    pub fn score(&self) -> Option<f64> {
        match self.outcome {
            CellOutcome::Scored { value } if !value.is_nan() => Some(value),
            _ => None,
        }
    }
}

/// Best cell and the per-cell record of the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// `(short_window, long_window)` of the winning cell.
    pub best_parameters: (usize, usize),
    pub best_metric_value: f64,
    pub metric: OptimizeMetric,
    /// One entry per grid cell, in grid order.
    pub cells: Vec<CellScore>,
    pub evaluated: usize,
    pub skipped: usize,
    /// True if the search was cut short; the winner covers completed cells only.
    pub cancelled: bool,
}

/// Grid search executor.
pub struct Optimizer {
    grid: MaGrid,
    parallel: bool,
    threads: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl Optimizer {
    pub fn new(grid: MaGrid) -> Self {
        Self {
            grid,
            parallel: true,
            threads: 0,
            cancel: None,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Dedicated pool size; 0 uses the global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Cooperative cancel flag, checked before each cell starts.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn grid(&self) -> &MaGrid {
        &self.grid
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_deref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    fn score_cell(
        &self,
        prices: &PriceSeries,
        metric: OptimizeMetric,
        cell: (usize, usize),
    ) -> CellScore {
        let (short_window, long_window) = cell;
        let outcome = if self.is_cancelled() {
            CellOutcome::Cancelled
        } else {
            match run_ma_strategy(prices, short_window, long_window) {
                Ok(bundle) => CellOutcome::Scored {
                    value: metric.extract(&evaluate(&bundle)),
                },
                Err(e) => CellOutcome::Skipped {
                    reason: e.to_string(),
                },
            }
        };
        debug!(short_window, long_window, ?outcome, "grid cell");
        CellScore {
            short_window,
            long_window,
            outcome,
        }
    }

    fn score_all(&self, prices: &PriceSeries, metric: OptimizeMetric) -> Vec<CellScore> {
        let cells = self.grid.cells();
        if !self.parallel {
            return cells
                .into_iter()
                .map(|c| self.score_cell(prices, metric, c))
                .collect();
        }

        let fan_out = || {
            cells
                .par_iter()
                .map(|&c| self.score_cell(prices, metric, c))
                .collect::<Vec<_>>()
        };

        if self.threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
            {
                Ok(pool) => return pool.install(fan_out),
                Err(e) => warn!(
                    threads = self.threads,
                    error = %e,
                    "thread pool unavailable, using global pool"
                ),
            }
        }
        fan_out()
    }

    /// Run the search over `prices`.
    ///
    /// Returns `None` when no cell produced a defined score. Per-cell engine
    /// failures are recorded as skipped cells, so the search itself cannot fail.
    pub fn run(
        &self,
        prices: &PriceSeries,
        metric: OptimizeMetric,
    ) -> Option<OptimizationResult> {
        let cells = self.score_all(prices, metric);

        // (index into cells, value)
        let mut best: Option<(usize, f64)> = None;
        for (i, cell) in cells.iter().enumerate() {
            if let Some(value) = cell.score() {
                if best.map_or(true, |(_, b)| metric.is_better(value, b)) {
                    best = Some((i, value));
                }
            }
        }

        let evaluated = cells
            .iter()
            .filter(|c| matches!(c.outcome, CellOutcome::Scored { .. }))
            .count();
        let skipped = cells
            .iter()
            .filter(|c| matches!(c.outcome, CellOutcome::Skipped { .. }))
            .count();
        let cancelled = cells
            .iter()
            .any(|c| matches!(c.outcome, CellOutcome::Cancelled));

        let Some((index, best_metric_value)) = best else {
            info!(metric = %metric, evaluated, skipped, cancelled, "no valid grid cell");
            return None;
        };
        let best_parameters = (cells[index].short_window, cells[index].long_window);
        info!(
            metric = %metric,
            short_window = best_parameters.0,
            long_window = best_parameters.1,
            value = best_metric_value,
            evaluated,
            skipped,
            cancelled,
            "optimization complete"
        );

        Some(OptimizationResult {
            best_parameters,
            best_metric_value,
            metric,
            cells,
            evaluated,
            skipped,
            cancelled,
        })
    }
}

/// Load `ticker` once and search the standard MA grid.
///
/// The metric name is checked before any data is loaded.
pub fn optimize_ma(
    loader: &dyn PriceLoader,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    metric: &str,
) -> Result<Option<OptimizationResult>, EngineError> {
    let metric: OptimizeMetric = metric.parse()?;
    let prices = loader.load(ticker, start, end)?;
    Ok(Optimizer::new(MaGrid::standard()).run(&prices, metric))
}
