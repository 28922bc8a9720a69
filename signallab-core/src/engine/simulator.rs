//! Backtest simulator: signals to positions, trades and growth curves.
//!
//! Generator-agnostic: it only needs a bar-aligned `Direction` series.
//!
//! Position rule: `Position[t] = Signal[t-1]` for t ≥ 1, and
//! `Position[0] = Signal[0]` for every strategy. Bar 0 carries a zero return,
//! so the seed never moves a growth curve.

use super::bundle::SimulationBundle;
use crate::domain::Direction;
use crate::indicators::rsi::simple_returns;
use crate::signals::{SignalFrame, StrategyParams};

/// Lag signals by one bar.
pub fn lag_positions(signals: &[Direction]) -> Vec<Direction> {
    let Some(&first) = signals.first() else {
        return Vec::new();
    };
    std::iter::once(first)
        .chain(signals[..signals.len() - 1].iter().copied())
        .collect()
}

/// `Trade[t] = Position[t] - Position[t-1]`, `Trade[0] = 0`.
pub fn trade_series(positions: &[Direction]) -> Vec<i8> {
    if positions.is_empty() {
        return Vec::new();
    }
    std::iter::once(0)
        .chain(positions.windows(2).map(|w| w[1].change_from(w[0])))
        .collect()
}

/// `S[0] = 1`, `S[t] = S[t-1] * (1 + Position[t] * r[t])`.
pub fn strategy_growth(positions: &[Direction], returns: &[f64]) -> Vec<f64> {
    let mut growth = Vec::with_capacity(returns.len());
    let mut level = 1.0;
    for (i, (pos, r)) in positions.iter().zip(returns).enumerate() {
        if i > 0 {
            level *= 1.0 + pos.as_f64() * r;
        }
        growth.push(level);
    }
    growth
}

/// Buy-and-hold growth: `B[t] = close[t] / close[0]`.
pub fn benchmark_growth(closes: &[f64]) -> Vec<f64> {
    match closes.first() {
        Some(&first) => closes.iter().map(|c| c / first).collect(),
        None => Vec::new(),
    }
}

/// Run the simulator over a generator's output.
pub fn simulate(frame: SignalFrame, strategy: StrategyParams) -> SimulationBundle {
    let SignalFrame {
        prices,
        signals,
        indicators,
        warmup,
    } = frame;

    let positions = lag_positions(&signals);
    let trades = trade_series(&positions);
    let returns = simple_returns(prices.bars());
    let strategy_returns = strategy_growth(&positions, &returns);
    let benchmark = benchmark_growth(&prices.closes());

    SimulationBundle {
        strategy,
        warmup,
        prices,
        signals,
        positions,
        trades,
        returns,
        strategy_returns,
        benchmark,
        indicators,
    }
}
