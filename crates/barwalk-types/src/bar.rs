//! OHLCV bar representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BarError;

/// A single fixed-interval price/volume observation.
///
/// The timestamp marks the start of the bar's interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the interval.
    pub high: f64,
    /// Lowest price during the interval.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl Bar {
    /// Creates a new bar without checking the price envelope.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Creates a new bar, rejecting inconsistent prices.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Bar::validate`] fails.
    pub fn try_new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarError> {
        let bar = Self::new(timestamp, open, high, low, close, volume);
        bar.validate()?;
        Ok(bar)
    }

    /// Checks that all values are finite, that high and low bound open and
    /// close, and that volume is non-negative.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), BarError> {
        let values = [self.open, self.high, self.low, self.close, self.volume];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BarError::NonFinite {
                timestamp: self.timestamp,
            });
        }

        if self.high < self.low
            || self.high < self.open.max(self.close)
            || self.low > self.open.min(self.close)
        {
            return Err(BarError::Envelope {
                timestamp: self.timestamp,
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                timestamp: self.timestamp,
                volume: self.volume,
            });
        }

        Ok(())
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns true if the bar closed above its open.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if the bar closed below its open.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Returns the typical price ((high + low + close) / 3).
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

impl std::fmt::Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} O={:.2} H={:.2} L={:.2} C={:.2} V={}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume as i64
        )
    }
}
