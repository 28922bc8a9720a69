//! Export: the CSV/JSON pair an external chart tool reads.
//!
//! - **bundle.csv**: one row per bar with the close, every indicator column,
//!   signal, position, trade and the three return series
//! - **report.json**: the `BacktestResult` (parameters, dataset hash,
//!   performance report, trade events)
//!
//! Export is one-shot: it reads a finished result and never feeds anything
//! back into the engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use signallab_core::engine::SimulationBundle;

use crate::optimizer::OptimizationResult;
use crate::runner::BacktestResult;

// ─── CSV export ─────────────────────────────────────────────────────

/// Per-bar CSV.
///
/// Columns: date, close, <indicator columns in name order>, signal, position,
/// trade, returns, strategy_returns, benchmark
pub fn export_bundle_csv(bundle: &SimulationBundle) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date".to_string(), "close".to_string()];
    header.extend(bundle.indicators.keys().cloned());
    header.extend(
        ["signal", "position", "trade", "returns", "strategy_returns", "benchmark"]
            .map(String::from),
    );
    wtr.write_record(&header)?;

    for (i, bar) in bundle.prices.bars().iter().enumerate() {
        let mut row = vec![bar.date.to_string(), format!("{:.6}", bar.close)];
        row.extend(bundle.indicators.values().map(|col| format!("{:.6}", col[i])));
        row.push(bundle.signals[i].value().to_string());
        row.push(bundle.positions[i].value().to_string());
        row.push(bundle.trades[i].to_string());
        row.push(format!("{:.8}", bundle.returns[i]));
        row.push(format!("{:.8}", bundle.strategy_returns[i]));
        row.push(format!("{:.8}", bundle.benchmark[i]));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON. NaN statistics become `null`.
pub fn export_report_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

pub fn export_optimization_json(result: &OptimizationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize OptimizationResult to JSON")
}

// ─── Artifact pair ──────────────────────────────────────────────────

/// Paths written by `save_artifacts`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub bundle_csv: PathBuf,
    pub report_json: PathBuf,
}

/// Write `bundle.csv` and `report.json` under `output_dir`, creating it.
///
/// Existing files are overwritten.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let paths = ArtifactPaths {
        bundle_csv: output_dir.join("bundle.csv"),
        report_json: output_dir.join("report.json"),
    };

    std::fs::write(&paths.bundle_csv, export_bundle_csv(&result.bundle)?)
        .with_context(|| format!("failed to write {}", paths.bundle_csv.display()))?;
    std::fs::write(&paths.report_json, export_report_json(result)?)
        .with_context(|| format!("failed to write {}", paths.report_json.display()))?;

    Ok(paths)
}
