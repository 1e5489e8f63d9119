//! Opening range of a session.

use barwalk_types::Bar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extremes over the first bars of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningRange {
    /// Highest high.
    pub high: f64,
    /// Lowest low.
    pub low: f64,
    /// Number of bars the range was computed from.
    pub bars: usize,
    /// Timestamp of the first bar.
    pub start: DateTime<Utc>,
    /// Timestamp of the last bar included.
    pub end: DateTime<Utc>,
}

impl OpeningRange {
    /// Returns the distance between high and low.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the midpoint of the range.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Returns true if `price` lies within `[low, high]`.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

impl std::fmt::Display for OpeningRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "high={:.2} low={:.2} over {} bars",
            self.high, self.low, self.bars
        )
    }
}

/// Computes the highest high and lowest low over the first `k` bars.
///
/// Returns `None` when `bars` is empty or `k` is zero. With fewer than `k`
/// bars the range covers all of them, and [`OpeningRange::bars`] says how
/// many were used.
///
/// # Example
///
/// ```
/// use barwalk_aggregate::opening_range;
/// use barwalk_types::Bar;
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let open = Utc.with_ymd_and_hms(2025, 9, 5, 13, 30, 0).unwrap();
/// let bars: Vec<Bar> = (0..30)
///     .map(|i| {
///         let p = 100.0 + f64::from(i);
///         Bar::new(open + TimeDelta::minutes(i64::from(i)), p, p + 1.0, p - 1.0, p, 10.0)
///     })
///     .collect();
///
/// let range = opening_range(&bars, 15).unwrap();
/// assert_eq!(range.high, 115.0);
/// assert_eq!(range.low, 99.0);
/// ```
#[must_use]
pub fn opening_range(bars: &[Bar], k: usize) -> Option<OpeningRange> {
    let window = &bars[..k.min(bars.len())];
    let (first, last) = (window.first()?, window.last()?);

    let (high, low) = window
        .iter()
        .fold((f64::NEG_INFINITY, f64::INFINITY), |(high, low), bar| {
            (high.max(bar.high), low.min(bar.low))
        });

    Some(OpeningRange {
        high,
        low,
        bars: window.len(),
        start: first.timestamp,
        end: last.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone};

    fn session(highs_lows: &[(f64, f64)]) -> Vec<Bar> {
        let open = Utc.with_ymd_and_hms(2025, 9, 5, 13, 30, 0).unwrap();
        highs_lows
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| {
                let mid = (high + low) / 2.0;
                Bar::new(open + TimeDelta::minutes(i as i64), mid, high, low, mid, 100.0)
            })
            .collect()
    }

    #[test]
    fn test_range_over_first_k() {
        let bars = session(&[(10.0, 9.0), (10.6, 9.8), (10.2, 8.7), (12.0, 7.0)]);
        let range = opening_range(&bars, 3).unwrap();

        assert_relative_eq!(range.high, 10.6);
        assert_relative_eq!(range.low, 8.7);
        assert_eq!(range.bars, 3);
        assert_eq!(range.start, bars[0].timestamp);
        assert_eq!(range.end, bars[2].timestamp);
        assert_relative_eq!(range.width(), 1.9, epsilon = 1e-12);
    }

    #[test]
    fn test_short_series_uses_all_bars() {
        let bars = session(&[(10.0, 9.0), (11.0, 9.5)]);
        let range = opening_range(&bars, 15).unwrap();
        assert_eq!(range.bars, 2);
        assert_relative_eq!(range.high, 11.0);
        assert_relative_eq!(range.low, 9.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(opening_range(&[], 15).is_none());
        let bars = session(&[(10.0, 9.0)]);
        assert!(opening_range(&bars, 0).is_none());
    }

    #[test]
    fn test_contains_and_midpoint() {
        let range = opening_range(&session(&[(12.0, 8.0)]), 1).unwrap();
        assert!(range.contains(8.0));
        assert!(range.contains(12.0));
        assert!(!range.contains(12.01));
        assert_relative_eq!(range.midpoint(), 10.0);
        assert_eq!(range.to_string(), "high=12.00 low=8.00 over 1 bars");
    }
}
