//! SignalLab CLI: single backtests, MA grid optimization and config-driven runs.
//!
//! Commands:
//! - `ma`: moving-average crossover backtest
//! - `rsi`: RSI mean-reversion backtest with hysteresis
//! - `optimize`: search the MA grid for the best value of a metric
//! - `run`: execute a backtest (or its optimizer section) from a TOML config

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use signallab_core::data::PriceLoader;
use signallab_runner::config::{BacktestSection, DataConfig, OptimizerConfig};
use signallab_runner::export::export_optimization_json;
use signallab_runner::{
    build_loader, export_report_json, run_backtest, run_optimization, save_artifacts,
    BacktestConfig, BacktestResult, DataSource, OptimizationResult, StrategyConfig,
};

#[derive(Parser)]
#[command(
    name = "signallab",
    about = "SignalLab CLI: signal backtesting and parameter search"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Ticker, date range and data source shared by every ad-hoc command.
#[derive(Args)]
struct DataArgs {
    /// Ticker symbol (e.g., SPY).
    #[arg(long, default_value = "SPY")]
    ticker: String,

    /// Start date (YYYY-MM-DD). Defaults to 2023-01-01.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Price source: csv, yahoo, synthetic or auto.
    #[arg(long, default_value = "auto")]
    source: DataSource,

    /// Directory of <TICKER>.csv files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

/// Output switches shared by every command.
#[derive(Args)]
struct OutputArgs {
    /// Write bundle.csv and report.json (or optimization.json) here.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the result as JSON instead of a text summary.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Moving-average crossover backtest.
    Ma {
        #[command(flatten)]
        data: DataArgs,

        /// Short SMA window.
        #[arg(long, default_value_t = 10)]
        short: usize,

        /// Long SMA window.
        #[arg(long, default_value_t = 50)]
        long: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// RSI mean-reversion backtest.
    Rsi {
        #[command(flatten)]
        data: DataArgs,

        /// RSI lookback period.
        #[arg(long, default_value_t = 14)]
        period: usize,

        /// Oversold threshold: go long when RSI falls below it.
        #[arg(long, default_value_t = 30.0)]
        lower: f64,

        /// Overbought threshold: go short when RSI rises above it.
        #[arg(long, default_value_t = 70.0)]
        upper: f64,

        /// Distance past a threshold that RSI must travel before the position resets.
        #[arg(long, default_value_t = 10.0)]
        exit_buffer: f64,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Search the standard MA grid for the best metric value.
    Optimize {
        #[command(flatten)]
        data: DataArgs,

        /// Metric to maximize: total_return, sharpe_ratio, information_ratio, drawdown.
        #[arg(long, default_value = "sharpe_ratio")]
        metric: String,

        /// Worker threads. 0 uses all cores.
        #[arg(long, default_value_t = 0)]
        threads: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Run the config's optimizer section instead of its strategy.
        #[arg(long, default_value_t = false)]
        optimize: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ma {
            data,
            short,
            long,
            output,
        } => {
            let strategy = StrategyConfig::MaCrossover {
                short_window: short,
                long_window: long,
            };
            backtest_cmd(&config_from_args(data, strategy, None)?, &output)
        }
        Commands::Rsi {
            data,
            period,
            lower,
            upper,
            exit_buffer,
            output,
        } => {
            let strategy = StrategyConfig::Rsi {
                period,
                lower_bound: lower,
                upper_bound: upper,
                exit_buffer,
            };
            backtest_cmd(&config_from_args(data, strategy, None)?, &output)
        }
        Commands::Optimize {
            data,
            metric,
            threads,
            output,
        } => {
            let optimizer = OptimizerConfig {
                metric,
                threads,
                ..OptimizerConfig::default()
            };
            let config = config_from_args(data, StrategyConfig::default(), Some(optimizer))?;
            optimize_cmd(&config, &output)
        }
        Commands::Run {
            config,
            optimize,
            output,
        } => {
            let config = BacktestConfig::from_file(&config)?;
            if optimize {
                optimize_cmd(&config, &output)
            } else {
                backtest_cmd(&config, &output)
            }
        }
    }
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` overrides the
/// default `info` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn config_from_args(
    data: DataArgs,
    strategy: StrategyConfig,
    optimizer: Option<OptimizerConfig>,
) -> Result<BacktestConfig> {
    let config = BacktestConfig {
        backtest: BacktestSection {
            ticker: data.ticker,
            start_date: data
                .start
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()),
            end_date: data.end.unwrap_or_else(|| chrono::Local::now().date_naive()),
        },
        strategy,
        data: DataConfig {
            source: data.source,
            dir: data.data_dir,
        },
        optimizer,
    };
    config.validate()?;
    Ok(config)
}

fn loader_for(config: &BacktestConfig) -> Result<Box<dyn PriceLoader>> {
    build_loader(&config.data)
        .with_context(|| format!("failed to set up {} loader", config.data.source))
}

fn backtest_cmd(config: &BacktestConfig, output: &OutputArgs) -> Result<()> {
    let loader = loader_for(config)?;
    let result = run_backtest(config, loader.as_ref())?;

    if output.json {
        println!("{}", export_report_json(&result)?);
    } else {
        print_summary(&result);
    }

    if let Some(dir) = &output.export {
        let paths = save_artifacts(&result, dir)?;
        info!(
            bundle = %paths.bundle_csv.display(),
            report = %paths.report_json.display(),
            "artifacts saved"
        );
    }
    Ok(())
}

fn optimize_cmd(config: &BacktestConfig, output: &OutputArgs) -> Result<()> {
    let loader = loader_for(config)?;
    let Some(result) = run_optimization(config, loader.as_ref(), None)? else {
        println!(
            "No parameter pair produced a defined score for {}.",
            config.backtest.ticker
        );
        return Ok(());
    };

    if output.json {
        println!("{}", export_optimization_json(&result)?);
    } else {
        print_optimization(&config.backtest.ticker, &result);
    }

    if let Some(dir) = &output.export {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("optimization.json");
        std::fs::write(&path, export_optimization_json(&result)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "optimization saved");
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let r = &result.report;
    println!();
    println!("=== Backtest Result ===");
    println!("Ticker:         {}", result.ticker);
    println!("Strategy:       {}", result.strategy.label());
    println!("Source:         {}", result.source);
    println!(
        "Period:         {} to {}",
        result.start_date, result.end_date
    );
    println!(
        "Bars:           {} ({} warmup)",
        result.bar_count, result.warmup_bars
    );
    println!("Trades:         {}", r.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {}", percent(r.total_return));
    println!("Sharpe:         {}", ratio(r.sharpe_ratio));
    println!("Volatility:     {}", percent(r.annualized_volatility));
    println!("Max Drawdown:   {}", percent(r.max_drawdown));
    println!("Info Ratio:     {}", ratio(r.information_ratio));
    println!(
        "Buy & Hold:     {}",
        percent(result.bundle.final_benchmark_level() - 1.0)
    );
    if result.source == "synthetic" {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_optimization(ticker: &str, result: &OptimizationResult) {
    println!();
    println!("=== MA Grid Search ===");
    println!("Ticker:         {ticker}");
    println!("Metric:         {}", result.metric.label());
    println!(
        "Cells:          {} ({} evaluated, {} skipped)",
        result.cells.len(),
        result.evaluated,
        result.skipped
    );
    println!(
        "Best:           short={} long={}",
        result.best_parameters.0, result.best_parameters.1
    );
    println!("Best Value:     {:.6}", result.best_metric_value);
    if result.cancelled {
        println!();
        println!("WARNING: search was cancelled before every cell ran");
    }
    println!();
}

fn percent(v: f64) -> String {
    if v.is_nan() {
        "n/a".into()
    } else {
        format!("{:.2}%", v * 100.0)
    }
}

fn ratio(v: f64) -> String {
    if v.is_nan() {
        "n/a".into()
    } else {
        format!("{v:.3}")
    }
}
