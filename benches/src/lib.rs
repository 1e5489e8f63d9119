//! Benchmark fixtures for barwalk.

use barwalk_lib::{FetchOptions, RequestPolicy, SessionHours, TimeRange};
use chrono::{TimeDelta, TimeZone};
use std::time::Duration;

/// A range of `days` calendar days ending Friday 2025-09-05 18:00 New York.
///
/// # Panics
///
/// Panics if `days` is zero.
#[must_use]
pub fn range_ending_friday(days: i64) -> TimeRange {
    let tz = SessionHours::nyse().timezone();
    let end = tz
        .with_ymd_and_hms(2025, 9, 5, 18, 0, 0)
        .single()
        .expect("unambiguous local time");
    let start = end - TimeDelta::days(days);
    TimeRange::from_zoned(start, end).expect("non-empty range")
}

/// Fetch options with validation on and no retry delays.
#[must_use]
pub fn bench_options() -> FetchOptions {
    FetchOptions {
        policy: RequestPolicy::no_retry(Duration::from_secs(30)),
        ..FetchOptions::default()
    }
}
