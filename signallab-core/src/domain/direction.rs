//! Direction: the {-1, 0, +1} encoding shared by signals and positions.

use serde::{Deserialize, Serialize};

/// Directional exposure for one bar.
///
/// Used both for the raw signal (what the rule recommends after seeing bar t)
/// and for the position (what is actually held during bar t after the lag).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    Short,
    #[default]
    Flat,
    Long,
}

impl Direction {
    pub fn value(self) -> i8 {
        match self {
            Direction::Short => -1,
            Direction::Flat => 0,
            Direction::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    /// Signed change from `prev` to `self`, in [-2, 2].
    pub fn change_from(self, prev: Direction) -> i8 {
        self.value() - prev.value()
    }
}

impl From<Direction> for i8 {
    fn from(d: Direction) -> Self {
        d.value()
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Direction::Short),
            0 => Ok(Direction::Flat),
            1 => Ok(Direction::Long),
            other => Err(format!("direction must be -1, 0 or 1, got {other}")),
        }
    }
}
