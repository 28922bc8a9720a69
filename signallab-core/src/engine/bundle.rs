//! SimulationBundle: the bar-aligned output of one backtest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Direction, PriceSeries};
use crate::signals::{IndicatorColumns, StrategyParams};

/// Every per-bar series produced by one simulator run.
///
/// All vectors have the same length as `prices` and index 0 is the first bar
/// after the generator's warmup.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationBundle {
    pub strategy: StrategyParams,
    /// Bars dropped from the input before index 0.
    pub warmup: usize,
    pub prices: PriceSeries,
    pub signals: Vec<Direction>,
    pub positions: Vec<Direction>,
    pub trades: Vec<i8>,
    /// Simple close-to-close returns, `returns[0] = 0`.
    pub returns: Vec<f64>,
    /// Growth of 1 under the strategy, `strategy_returns[0] = 1`.
    pub strategy_returns: Vec<f64>,
    /// Growth of 1 under buy-and-hold.
    pub benchmark: Vec<f64>,
    pub indicators: IndicatorColumns,
}

/// Classification of a bar where the position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    EnterLong,
    EnterShort,
    Exit,
    Flip,
}

impl TradeKind {
    /// Classify a position change; `None` if nothing changed.
    pub fn classify(prev: Direction, next: Direction) -> Option<TradeKind> {
        use Direction::{Flat, Long, Short};
        match (prev, next) {
            (a, b) if a == b => None,
            (Flat, Long) => Some(TradeKind::EnterLong),
            (Flat, Short) => Some(TradeKind::EnterShort),
            (_, Flat) => Some(TradeKind::Exit),
            _ => Some(TradeKind::Flip),
        }
    }
}

/// One position change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub kind: TradeKind,
    pub from: Direction,
    pub to: Direction,
}

impl SimulationBundle {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Every bar whose position differs from the previous bar's.
    pub fn trade_events(&self) -> Vec<TradeEvent> {
        let bars = self.prices.bars();
        self.positions
            .windows(2)
            .enumerate()
            .filter_map(|(i, w)| {
                TradeKind::classify(w[0], w[1]).map(|kind| TradeEvent {
                    bar_index: i + 1,
                    date: bars[i + 1].date,
                    close: bars[i + 1].close,
                    kind,
                    from: w[0],
                    to: w[1],
                })
            })
            .collect()
    }

    /// Final strategy growth level.
    pub fn final_strategy_level(&self) -> f64 {
        self.strategy_returns.last().copied().unwrap_or(1.0)
    }

    /// Final buy-and-hold growth level.
    pub fn final_benchmark_level(&self) -> f64 {
        self.benchmark.last().copied().unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Flat, Long, Short};

    #[test]
    fn classify_all_transitions() {
        assert_eq!(TradeKind::classify(Flat, Long), Some(TradeKind::EnterLong));
        assert_eq!(TradeKind::classify(Flat, Short), Some(TradeKind::EnterShort));
        assert_eq!(TradeKind::classify(Long, Flat), Some(TradeKind::Exit));
        assert_eq!(TradeKind::classify(Short, Flat), Some(TradeKind::Exit));
        assert_eq!(TradeKind::classify(Long, Short), Some(TradeKind::Flip));
        assert_eq!(TradeKind::classify(Short, Long), Some(TradeKind::Flip));
        assert_eq!(TradeKind::classify(Long, Long), None);
    }
}
