//! RSI hysteresis state machine.
//!
//! Three states walked one bar at a time. The transition table below is the
//! only place entry/exit rules live; the RSI generator feeds it numbers and
//! records the resulting state.
//!
//! | from      | condition                      | to        |
//! |-----------|--------------------------------|-----------|
//! | `Neutral` | rsi < lower                    | `Long`    |
//! | `Neutral` | rsi > upper                    | `Short`   |
//! | `Long`    | rsi > lower + exit_buffer      | `Neutral` |
//! | `Short`   | rsi < upper - exit_buffer      | `Neutral` |
//!
//! Everything else stays put. From `Neutral` the long entry is checked first.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;
use crate::error::EngineError;

/// Validated RSI entry/exit thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiThresholds {
    lower: f64,
    upper: f64,
    exit_buffer: f64,
}

impl RsiThresholds {
    /// Requires `0 < lower < upper < 100`, `exit_buffer >= 0`, and a buffer
    /// narrow enough that both exit levels stay strictly inside the band.
    pub fn new(lower: f64, upper: f64, exit_buffer: f64) -> Result<Self, EngineError> {
        if !(lower.is_finite() && upper.is_finite() && exit_buffer.is_finite()) {
            return Err(EngineError::invalid("RSI thresholds must be finite"));
        }
        if !(0.0 < lower && lower < upper && upper < 100.0) {
            return Err(EngineError::invalid(format!(
                "RSI bounds must satisfy 0 < lower < upper < 100, got lower={lower}, upper={upper}"
            )));
        }
        if exit_buffer < 0.0 {
            return Err(EngineError::invalid(format!(
                "exit_buffer must be non-negative, got {exit_buffer}"
            )));
        }
        if upper - exit_buffer <= lower || lower + exit_buffer >= upper {
            return Err(EngineError::invalid(format!(
                "exit_buffer {exit_buffer} collapses the band between lower={lower} and upper={upper}"
            )));
        }
        Ok(Self {
            lower,
            upper,
            exit_buffer,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn exit_buffer(&self) -> f64 {
        self.exit_buffer
    }

    /// RSI level above which a long position is closed.
    pub fn long_exit(&self) -> f64 {
        self.lower + self.exit_buffer
    }

    /// RSI level below which a short position is closed.
    pub fn short_exit(&self) -> f64 {
        self.upper - self.exit_buffer
    }
}

/// State of the RSI mean-reversion rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsiState {
    #[default]
    Neutral,
    Long,
    Short,
}

impl RsiState {
    /// Apply one bar's RSI reading.
    ///
    /// A NaN reading satisfies no condition and leaves the state unchanged.
    pub fn next(self, rsi: f64, t: &RsiThresholds) -> RsiState {
        match self {
            RsiState::Neutral => {
                if rsi < t.lower {
                    RsiState::Long
                } else if rsi > t.upper {
                    RsiState::Short
                } else {
                    RsiState::Neutral
                }
            }
            RsiState::Long => {
                if rsi > t.long_exit() {
                    RsiState::Neutral
                } else {
                    RsiState::Long
                }
            }
            RsiState::Short => {
                if rsi < t.short_exit() {
                    RsiState::Neutral
                } else {
                    RsiState::Short
                }
            }
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            RsiState::Neutral => Direction::Flat,
            RsiState::Long => Direction::Long,
            RsiState::Short => Direction::Short,
        }
    }
}

/// Walk the machine over a reading sequence, starting from `Neutral`.
///
/// Returns the state after each reading.
pub fn walk(readings: &[f64], thresholds: &RsiThresholds) -> Vec<RsiState> {
    readings
        .iter()
        .scan(RsiState::Neutral, |state, &rsi| {
            *state = state.next(rsi, thresholds);
            Some(*state)
        })
        .collect()
}
