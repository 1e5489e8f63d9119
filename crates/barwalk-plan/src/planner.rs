//! Window planning policies.

use barwalk_types::{TimeRange, Tz, Window, WindowSize, WindowSizeError};
use chrono::{DateTime, Days, TimeDelta, TimeZone, Utc};

use crate::{PlanError, TradingCalendar};

/// Plans request windows over a time range, newest window first.
#[derive(Debug, Clone)]
pub struct WindowPlanner<C> {
    calendar: C,
}

impl<C: TradingCalendar> WindowPlanner<C> {
    /// Creates a planner backed by the given trading calendar.
    ///
    /// The calendar's timezone drives calendar-day arithmetic; its sessions
    /// drive the session policy.
    #[must_use]
    pub const fn new(calendar: C) -> Self {
        Self { calendar }
    }

    /// Returns the trading calendar.
    #[must_use]
    pub const fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Plans the windows covering `range`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the window size is zero; no windows are produced.
    pub fn plan(&self, range: TimeRange, size: WindowSize) -> Result<Vec<Window>, PlanError> {
        let windows: Vec<Window> = match size.validate()? {
            WindowSize::Days(_) => {
                CalendarWindows::new(range, size, self.calendar.timezone())?.collect()
            }
            WindowSize::Sessions(n) => session_windows(range, n, &self.calendar)?,
        };

        tracing::debug!(
            range = %range,
            size = %size,
            windows = windows.len(),
            "planned request windows"
        );
        Ok(windows)
    }

    /// Validates raw endpoints and plans the windows between them.
    ///
    /// # Errors
    ///
    /// Returns an error if `start >= end` or the window size is zero; no
    /// windows are produced.
    pub fn plan_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        size: WindowSize,
    ) -> Result<Vec<Window>, PlanError> {
        let range = TimeRange::new(start, end)?;
        self.plan(range, size)
    }
}

/// Lazy calendar-policy walk from `range.end` back to `range.start`.
///
/// Each step moves the window end back by a whole number of local calendar
/// days in the exchange timezone. The oldest window is clamped to
/// `range.start`, so consecutive windows share boundaries with no gaps.
#[derive(Debug, Clone)]
pub struct CalendarWindows {
    start: DateTime<Utc>,
    current_end: DateTime<Utc>,
    size: WindowSize,
    tz: Tz,
}

impl CalendarWindows {
    /// Creates the walk for the given range and window size.
    ///
    /// # Errors
    ///
    /// Returns an error if the window size is zero.
    pub const fn new(range: TimeRange, size: WindowSize, tz: Tz) -> Result<Self, WindowSizeError> {
        let size = match size.validate() {
            Ok(size) => size,
            Err(e) => return Err(e),
        };
        Ok(Self {
            start: range.start(),
            current_end: range.end(),
            size,
            tz,
        })
    }
}

impl Iterator for CalendarWindows {
    type Item = Window;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_end <= self.start {
            return None;
        }

        let back = step_back_days(self.current_end, self.size.count(), self.tz);
        let chunk_start = back.max(self.start);
        let window = Window::new(chunk_start, self.current_end, self.size)?;

        self.current_end = chunk_start;
        Some(window)
    }
}

impl std::iter::FusedIterator for CalendarWindows {}

/// Moves an instant back by `days` local calendar days.
///
/// Ambiguous local results take the earlier instant. If the local result
/// does not exist (DST gap), falls back to fixed 24-hour days.
fn step_back_days(instant: DateTime<Utc>, days: u32, tz: Tz) -> DateTime<Utc> {
    let fixed = instant - TimeDelta::days(i64::from(days));

    instant
        .with_timezone(&tz)
        .naive_local()
        .checked_sub_days(Days::new(u64::from(days)))
        .and_then(|local| tz.from_local_datetime(&local).earliest())
        .map_or(fixed, |dt| dt.with_timezone(&Utc))
}

/// Session policy: batches of `per_window` consecutive sessions, counted back
/// from the most recent session, each clamped to `range`.
///
/// Windows span from the oldest session's open to the newest session's close,
/// so overnight gaps between batches carry no request.
///
/// # Errors
///
/// Returns an error if `per_window` is zero.
pub fn session_windows(
    range: TimeRange,
    per_window: u32,
    calendar: &impl TradingCalendar,
) -> Result<Vec<Window>, WindowSizeError> {
    let size = WindowSize::sessions(per_window)?;
    let batch = usize::try_from(per_window).unwrap_or(usize::MAX);

    Ok(calendar
        .sessions(&range)
        .rchunks(batch)
        .filter_map(|chunk| {
            let oldest = chunk.first()?;
            let newest = chunk.last()?;
            let start = oldest.open.max(range.start());
            let end = newest.close.min(range.end());
            Window::new(start, end, size)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeekdayCalendar;
    use barwalk_types::SessionHours;
    use chrono::{NaiveDate, Timelike};

    const NY: Tz = Tz::America__New_York;

    fn ny(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        NY.with_ymd_and_hms(2025, month, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn planner() -> WindowPlanner<WeekdayCalendar> {
        WindowPlanner::new(WeekdayCalendar::new(SessionHours::nyse()))
    }

    fn assert_exact_cover(range: TimeRange, windows: &[Window]) {
        // Newest first: each window ends where the previous one started.
        assert_eq!(windows.first().unwrap().chunk_end(), range.end());
        assert_eq!(windows.last().unwrap().chunk_start(), range.start());
        for pair in windows.windows(2) {
            assert_eq!(pair[0].chunk_start(), pair[1].chunk_end());
        }
        for window in windows {
            assert!(window.chunk_start() < window.chunk_end());
        }
    }

    #[test]
    fn test_four_day_range_gives_four_windows() {
        let range = TimeRange::new(ny(9, 1, 9, 30), ny(9, 4, 18, 0)).unwrap();
        let windows = planner().plan(range, WindowSize::days(1).unwrap()).unwrap();

        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].chunk_start(), ny(9, 3, 18, 0));
        assert_eq!(windows[0].chunk_end(), ny(9, 4, 18, 0));
        // Oldest window is clamped to the range start.
        assert_eq!(windows[3].chunk_start(), ny(9, 1, 9, 30));
        assert_eq!(windows[3].chunk_end(), ny(9, 1, 18, 0));
        assert_exact_cover(range, &windows);
    }

    #[test]
    fn test_short_range_gives_one_clamped_window() {
        let range = TimeRange::new(ny(9, 2, 9, 30), ny(9, 2, 16, 0)).unwrap();
        let windows = planner().plan(range, WindowSize::days(1).unwrap()).unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].chunk_start(), range.start());
        assert_eq!(windows[0].chunk_end(), range.end());
    }

    #[test]
    fn test_multi_day_windows_cover_range() {
        let range = TimeRange::new(ny(8, 1, 0, 0), ny(9, 1, 0, 0)).unwrap();
        let windows = planner().plan(range, WindowSize::days(7).unwrap()).unwrap();

        // 31 days in 7-day steps: 4 full windows plus one 3-day remainder.
        assert_eq!(windows.len(), 5);
        assert_eq!(
            windows[4].chunk_end() - windows[4].chunk_start(),
            TimeDelta::days(3)
        );
        assert_exact_cover(range, &windows);
    }

    #[test]
    fn test_calendar_days_follow_local_clock_across_dst() {
        // US DST starts on 2025-03-09.
        let range = TimeRange::new(ny(3, 7, 18, 0), ny(3, 10, 18, 0)).unwrap();
        let windows = planner().plan(range, WindowSize::days(1).unwrap()).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(
            windows[1].chunk_end() - windows[1].chunk_start(),
            TimeDelta::hours(23)
        );
        for window in &windows {
            assert_eq!(window.chunk_start().with_timezone(&NY).hour(), 18);
        }
        assert_exact_cover(range, &windows);
    }

    #[test]
    fn test_calendar_walk_is_restartable() {
        let range = TimeRange::new(ny(9, 1, 9, 30), ny(9, 4, 18, 0)).unwrap();
        let size = WindowSize::days(1).unwrap();
        let first: Vec<_> = CalendarWindows::new(range, size, NY).unwrap().collect();
        let second: Vec<_> = CalendarWindows::new(range, size, NY).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_range_rejected_before_planning() {
        let t = ny(9, 2, 9, 30);
        let result = planner().plan_between(t, t, WindowSize::Days(1));
        assert!(matches!(result, Err(PlanError::Range(_))));
    }

    #[test]
    fn test_zero_window_size_rejected_before_planning() {
        for size in [WindowSize::Days(0), WindowSize::Sessions(0)] {
            let result = planner().plan_between(ny(9, 1, 9, 30), ny(9, 4, 18, 0), size);
            assert!(matches!(result, Err(PlanError::WindowSize(_))), "{size:?}");
        }

        let range = TimeRange::new(ny(9, 1, 9, 30), ny(9, 4, 18, 0)).unwrap();
        assert!(CalendarWindows::new(range, WindowSize::Days(0), NY).is_err());
        assert!(session_windows(range, 0, &WeekdayCalendar::default()).is_err());
    }

    #[test]
    fn test_session_batches_newest_first() {
        // Mon 8th through Fri 12th: five sessions.
        let range = TimeRange::new(ny(9, 8, 0, 0), ny(9, 13, 0, 0)).unwrap();
        let windows = planner().plan(range, WindowSize::sessions(2).unwrap()).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].chunk_start(), ny(9, 11, 9, 30));
        assert_eq!(windows[0].chunk_end(), ny(9, 12, 16, 0));
        assert_eq!(windows[1].chunk_start(), ny(9, 9, 9, 30));
        assert_eq!(windows[1].chunk_end(), ny(9, 10, 16, 0));
        assert_eq!(windows[2].chunk_start(), ny(9, 8, 9, 30));
        assert_eq!(windows[2].chunk_end(), ny(9, 8, 16, 0));
    }

    #[test]
    fn test_session_windows_clamped_to_range() {
        let range = TimeRange::new(ny(9, 8, 12, 0), ny(9, 9, 11, 0)).unwrap();
        let windows = planner().plan(range, WindowSize::sessions(1).unwrap()).unwrap();

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].chunk_start(), ny(9, 9, 9, 30));
        assert_eq!(windows[0].chunk_end(), ny(9, 9, 11, 0));
        assert_eq!(windows[1].chunk_start(), ny(9, 8, 12, 0));
        assert_eq!(windows[1].chunk_end(), ny(9, 8, 16, 0));
    }

    #[test]
    fn test_session_policy_skips_holidays() {
        let calendar = WeekdayCalendar::new(SessionHours::nyse())
            .with_holidays([NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()]);
        let range = TimeRange::new(ny(8, 29, 0, 0), ny(9, 3, 0, 0)).unwrap();
        let windows = WindowPlanner::new(calendar).plan(range, WindowSize::Sessions(5)).unwrap();

        // Fri 29th and Tue 2nd only.
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].chunk_start(), ny(8, 29, 9, 30));
        assert_eq!(windows[0].chunk_end(), ny(9, 2, 16, 0));
    }

    #[test]
    fn test_weekend_range_has_no_session_windows() {
        let range = TimeRange::new(ny(9, 6, 0, 0), ny(9, 8, 0, 0)).unwrap();
        assert!(planner().plan(range, WindowSize::Sessions(1)).unwrap().is_empty());
    }
}
