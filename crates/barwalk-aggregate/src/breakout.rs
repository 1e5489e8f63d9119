//! Opening-range breakout detection.

use barwalk_types::Bar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::OpeningRange;

/// Side of the opening range a close broke through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Close above the range high.
    Up,
    /// Close below the range low.
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// A detected breakout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakout {
    /// Which side was broken.
    pub direction: Direction,
    /// Timestamp of the breaking bar.
    pub timestamp: DateTime<Utc>,
    /// Close of the breaking bar.
    pub close: f64,
    /// The range level that was crossed.
    pub level: f64,
}

/// Watches bars after the opening range and reports the first close beyond
/// each side. Each direction fires at most once.
#[derive(Debug, Clone)]
pub struct BreakoutMonitor {
    range: OpeningRange,
    fired_up: bool,
    fired_down: bool,
}

impl BreakoutMonitor {
    /// Creates a monitor for the given range.
    #[must_use]
    pub const fn new(range: OpeningRange) -> Self {
        Self {
            range,
            fired_up: false,
            fired_down: false,
        }
    }

    /// Returns the range being monitored.
    #[must_use]
    pub const fn range(&self) -> &OpeningRange {
        &self.range
    }

    /// Returns true once both directions have fired.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.fired_up && self.fired_down
    }

    /// Feeds one bar. Bars at or before the end of the range are ignored.
    pub fn observe(&mut self, bar: &Bar) -> Option<Breakout> {
        if bar.timestamp <= self.range.end {
            return None;
        }

        if !self.fired_up && bar.close > self.range.high {
            self.fired_up = true;
            return Some(Breakout {
                direction: Direction::Up,
                timestamp: bar.timestamp,
                close: bar.close,
                level: self.range.high,
            });
        }

        if !self.fired_down && bar.close < self.range.low {
            self.fired_down = true;
            return Some(Breakout {
                direction: Direction::Down,
                timestamp: bar.timestamp,
                close: bar.close,
                level: self.range.low,
            });
        }

        None
    }

    /// Feeds a batch of bars, returning every breakout in order.
    pub fn scan<'a>(&mut self, bars: impl IntoIterator<Item = &'a Bar>) -> Vec<Breakout> {
        bars.into_iter().filter_map(|bar| self.observe(bar)).collect()
    }
}
