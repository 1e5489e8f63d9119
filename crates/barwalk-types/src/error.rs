//! Error types for barwalk core values.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error for invalid time ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeError {
    /// Start is not strictly before end.
    #[error("Empty time range: {start} >= {end}")]
    Empty {
        /// The start instant.
        start: DateTime<Utc>,
        /// The end instant.
        end: DateTime<Utc>,
    },
}

/// Error for invalid window sizes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSizeError {
    /// Window size must be at least one unit.
    #[error("Window size must be positive, got 0 {unit}")]
    Zero {
        /// The unit of the rejected size ("days" or "sessions").
        unit: &'static str,
    },
}

/// Error for bars whose prices are not a consistent OHLC envelope.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BarError {
    /// A price or the volume is NaN or infinite.
    #[error("Non-finite value in bar at {timestamp}")]
    NonFinite {
        /// Timestamp of the offending bar.
        timestamp: DateTime<Utc>,
    },

    /// High/low do not bound open and close.
    #[error(
        "Inconsistent bar at {timestamp}: open={open} high={high} low={low} close={close}"
    )]
    Envelope {
        /// Timestamp of the offending bar.
        timestamp: DateTime<Utc>,
        /// Open price.
        open: f64,
        /// High price.
        high: f64,
        /// Low price.
        low: f64,
        /// Close price.
        close: f64,
    },

    /// Volume is negative.
    #[error("Negative volume {volume} in bar at {timestamp}")]
    NegativeVolume {
        /// Timestamp of the offending bar.
        timestamp: DateTime<Utc>,
        /// The reported volume.
        volume: f64,
    },
}

/// Error raised when a series would lose strict chronological order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// Two bars are out of order or share a timestamp.
    #[error("Series out of order: {previous} is not before {next}")]
    OutOfOrder {
        /// The earlier position's timestamp.
        previous: DateTime<Utc>,
        /// The later position's timestamp.
        next: DateTime<Utc>,
    },
}

/// Error for unparseable date/time arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    /// The text matches none of the accepted layouts.
    #[error(
        "Invalid date/time '{0}', expected YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS] or YYYY-MM-DDTHH:MM[:SS]"
    )]
    Format(String),

    /// The local time does not exist in the exchange timezone (DST gap).
    #[error("Local time '{0}' does not exist in {1}")]
    Nonexistent(String, String),
}
