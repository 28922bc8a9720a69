//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! ticker = "SPY"
//! start_date = "2023-01-01"
//! end_date = "2024-12-31"
//!
//! [strategy]
//! type = "ma_crossover"      # or "rsi"
//! short_window = 10
//! long_window = 50
//!
//! [data]
//! source = "csv"             # csv | yahoo | synthetic | auto
//! dir = "data"
//!
//! [optimizer]                # optional
//! metric = "sharpe_ratio"
//! threads = 0
//! ```
//!
//! Omitted strategy parameters take the usual defaults (MA 10/50, RSI 14 with
//! bounds 30/70 and exit buffer 10).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use signallab_core::signals::StrategyParams;

use crate::fitness::OptimizeMetric;
use crate::optimizer::MaGrid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub optimizer: Option<OptimizerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub ticker: String,
    /// Inclusive, `%Y-%m-%d`.
    pub start_date: NaiveDate,
    /// Inclusive, `%Y-%m-%d`.
    pub end_date: NaiveDate,
}

/// Strategy section; missing parameters fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    #[serde(alias = "ma")]
    MaCrossover {
        #[serde(default = "default_short_window")]
        short_window: usize,
        #[serde(default = "default_long_window")]
        long_window: usize,
    },
    #[serde(alias = "rsi_reversion")]
    Rsi {
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default = "default_lower_bound")]
        lower_bound: f64,
        #[serde(default = "default_upper_bound")]
        upper_bound: f64,
        #[serde(default = "default_exit_buffer")]
        exit_buffer: f64,
    },
}

fn default_short_window() -> usize {
    10
}
fn default_long_window() -> usize {
    50
}
fn default_rsi_period() -> usize {
    14
}
fn default_lower_bound() -> f64 {
    30.0
}
fn default_upper_bound() -> f64 {
    70.0
}
fn default_exit_buffer() -> f64 {
    10.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::MaCrossover {
            short_window: default_short_window(),
            long_window: default_long_window(),
        }
    }
}

impl StrategyConfig {
    pub fn default_rsi() -> Self {
        Self::Rsi {
            period: default_rsi_period(),
            lower_bound: default_lower_bound(),
            upper_bound: default_upper_bound(),
            exit_buffer: default_exit_buffer(),
        }
    }

    pub fn to_params(self) -> StrategyParams {
        match self {
            Self::MaCrossover {
                short_window,
                long_window,
            } => StrategyParams::MaCrossover {
                short_window,
                long_window,
            },
            Self::Rsi {
                period,
                lower_bound,
                upper_bound,
                exit_buffer,
            } => StrategyParams::Rsi {
                period,
                lower_bound,
                upper_bound,
                exit_buffer,
            },
        }
    }
}

/// Where prices come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Yahoo,
    Synthetic,
    /// CSV, then Yahoo, then synthetic.
    #[default]
    Auto,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Yahoo => "yahoo",
            Self::Synthetic => "synthetic",
            Self::Auto => "auto",
        })
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "yahoo" => Ok(Self::Yahoo),
            "synthetic" => Ok(Self::Synthetic),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown data source '{other}' (expected csv, yahoo, synthetic or auto)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: DataSource,
    /// Directory of `<TICKER>.csv` files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(flatten)]
    pub grid: MaGrid,
    /// 0 uses the global rayon pool.
    #[serde(default)]
    pub threads: usize,
}

fn default_metric() -> String {
    OptimizeMetric::default().as_str().to_string()
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            metric: default_metric(),
            grid: MaGrid::standard(),
            threads: 0,
        }
    }
}

impl OptimizerConfig {
    pub fn metric(&self) -> Result<OptimizeMetric, signallab_core::error::EngineError> {
        self.metric.parse()
    }
}

impl BacktestConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("backtest.ticker is empty".into()));
        }
        if self.backtest.start_date > self.backtest.end_date {
            return Err(ConfigError::Invalid(format!(
                "backtest.start_date {} is after end_date {}",
                self.backtest.start_date, self.backtest.end_date
            )));
        }
        self.strategy
            .to_params()
            .generator()
            .map_err(|e| ConfigError::Invalid(format!("strategy: {e}")))?;
        if let Some(opt) = &self.optimizer {
            opt.metric()
                .map_err(|e| ConfigError::Invalid(format!("optimizer: {e}")))?;
            if opt.grid.size() == 0 {
                return Err(ConfigError::Invalid(
                    "optimizer grid has no short or no long windows".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn params(&self) -> StrategyParams {
        self.strategy.to_params()
    }
}
