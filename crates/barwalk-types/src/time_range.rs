//! Time ranges and exchange-local timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{TimeParseError, TimeRangeError};

/// A half-open span of time `[start, end)` for data retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new time range, validating that start < end.
    ///
    /// # Errors
    ///
    /// Returns an error if start >= end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range from any timezone-aware endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if start >= end.
    pub fn from_zoned<Z: TimeZone>(
        start: DateTime<Z>,
        end: DateTime<Z>,
    ) -> Result<Self, TimeRangeError> {
        Self::new(start.with_timezone(&Utc), end.with_timezone(&Utc))
    }

    /// Returns the start instant (inclusive).
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the end instant (exclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the length of the range.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if the range contains the given instant.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Returns true if `[start, end)` shares any instant with this range.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Parses a local date or date-time in the given exchange timezone.
///
/// Accepted layouts: `YYYY-MM-DD` (local midnight), `YYYY-MM-DD HH:MM`,
/// `YYYY-MM-DD HH:MM:SS`, and the same with a `T` separator. Ambiguous local
/// times (DST fall-back) resolve to the earlier instant.
///
/// # Errors
///
/// Returns an error if the text does not parse or names a local time that
/// the timezone skips.
///
/// # Example
///
/// ```
/// use barwalk_types::parse_local_datetime;
/// use chrono::{TimeZone, Utc};
///
/// let t = parse_local_datetime("2025-09-02 09:30", &chrono_tz::America::New_York).unwrap();
/// assert_eq!(t, Utc.with_ymd_and_hms(2025, 9, 2, 13, 30, 0).unwrap());
/// ```
pub fn parse_local_datetime(text: &str, tz: &Tz) -> Result<DateTime<Utc>, TimeParseError> {
    let text = text.trim();
    let naive = parse_naive(text).ok_or_else(|| TimeParseError::Format(text.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeParseError::Nonexistent(text.to_string(), tz.name().to_string()))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    const LAYOUTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    #[test]
    fn test_time_range_new() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 13, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 9, 4, 22, 0, 0).unwrap();
        let range = TimeRange::new(start, end).unwrap();

        assert_eq!(range.start(), start);
        assert_eq!(range.end(), end);
        assert!(range.contains(start));
        assert!(!range.contains(end));
    }

    #[test]
    fn test_time_range_empty_rejected() {
        let t = Utc.with_ymd_and_hms(2025, 9, 1, 13, 30, 0).unwrap();
        assert!(matches!(
            TimeRange::new(t, t),
            Err(TimeRangeError::Empty { .. })
        ));
        assert!(TimeRange::new(t + TimeDelta::minutes(1), t).is_err());
    }

    #[test]
    fn test_from_zoned() {
        let start = New_York.with_ymd_and_hms(2025, 9, 1, 9, 30, 0).unwrap();
        let end = New_York.with_ymd_and_hms(2025, 9, 4, 18, 0, 0).unwrap();
        let range = TimeRange::from_zoned(start, end).unwrap();
        assert_eq!(
            range.start(),
            Utc.with_ymd_and_hms(2025, 9, 1, 13, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_overlaps() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let range = TimeRange::new(start, start + TimeDelta::hours(10)).unwrap();

        assert!(range.overlaps(start - TimeDelta::hours(1), start + TimeDelta::hours(1)));
        assert!(!range.overlaps(start - TimeDelta::hours(2), start));
        assert!(!range.overlaps(range.end(), range.end() + TimeDelta::hours(1)));
    }

    #[test]
    fn test_parse_local_layouts() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 2, 13, 30, 0).unwrap();
        for text in [
            "2025-09-02 09:30",
            "2025-09-02T09:30",
            "2025-09-02 09:30:00",
            " 2025-09-02T09:30:00 ",
        ] {
            assert_eq!(parse_local_datetime(text, &New_York).unwrap(), expected);
        }

        let midnight = parse_local_datetime("2025-09-02", &New_York).unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 9, 2, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_local_errors() {
        assert!(matches!(
            parse_local_datetime("09/02/2025", &New_York),
            Err(TimeParseError::Format(_))
        ));
        // 02:30 on the spring-forward day does not exist in New York.
        assert!(matches!(
            parse_local_datetime("2025-03-09 02:30", &New_York),
            Err(TimeParseError::Nonexistent(..))
        ));
    }
}
