//! Request windows.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::WindowSizeError;

/// Size of one request window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSize {
    /// A fixed number of calendar days.
    Days(u32),
    /// A fixed number of consecutive trading sessions.
    Sessions(u32),
}

impl WindowSize {
    /// Creates a calendar-day window size.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is zero.
    pub const fn days(days: u32) -> Result<Self, WindowSizeError> {
        if days == 0 {
            return Err(WindowSizeError::Zero { unit: "days" });
        }
        Ok(Self::Days(days))
    }

    /// Creates a trading-session window size.
    ///
    /// # Errors
    ///
    /// Returns an error if `sessions` is zero.
    pub const fn sessions(sessions: u32) -> Result<Self, WindowSizeError> {
        if sessions == 0 {
            return Err(WindowSizeError::Zero { unit: "sessions" });
        }
        Ok(Self::Sessions(sessions))
    }

    /// Re-checks a size built directly from its variants.
    ///
    /// # Errors
    ///
    /// Returns an error if the count is zero.
    pub const fn validate(self) -> Result<Self, WindowSizeError> {
        match self {
            Self::Days(n) => Self::days(n),
            Self::Sessions(n) => Self::sessions(n),
        }
    }

    /// Returns the number of units in the window.
    #[must_use]
    pub const fn count(&self) -> u32 {
        match self {
            Self::Days(n) | Self::Sessions(n) => *n,
        }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n} D"),
            Self::Sessions(n) => write!(f, "{n} sessions"),
        }
    }
}

/// A bounded sub-range for which one provider request is issued.
///
/// Windows are half-open: a bar belongs to the window when
/// `chunk_start <= timestamp < chunk_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    chunk_start: DateTime<Utc>,
    chunk_end: DateTime<Utc>,
    size: WindowSize,
}

impl Window {
    /// Creates a window, returning `None` unless `chunk_start < chunk_end`.
    #[must_use]
    pub fn new(
        chunk_start: DateTime<Utc>,
        chunk_end: DateTime<Utc>,
        size: WindowSize,
    ) -> Option<Self> {
        (chunk_start < chunk_end).then_some(Self {
            chunk_start,
            chunk_end,
            size,
        })
    }

    /// Returns the inclusive lower bound.
    #[must_use]
    pub const fn chunk_start(&self) -> DateTime<Utc> {
        self.chunk_start
    }

    /// Returns the exclusive upper bound.
    #[must_use]
    pub const fn chunk_end(&self) -> DateTime<Utc> {
        self.chunk_end
    }

    /// Returns the time covered by the window.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.chunk_end - self.chunk_start
    }

    /// Returns the nominal size the window was planned with.
    #[must_use]
    pub const fn size(&self) -> WindowSize {
        self.size
    }

    /// Returns true if the instant falls in `[chunk_start, chunk_end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.chunk_start <= instant && instant < self.chunk_end
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.chunk_start, self.chunk_end)
    }
}
