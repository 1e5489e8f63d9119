//! Trading calendars.

use std::collections::BTreeSet;

use barwalk_types::{Session, SessionHours, TimeRange, Tz};
use chrono::{Datelike, NaiveDate, Weekday};

/// Source of trading sessions for the session window policy.
pub trait TradingCalendar: Send + Sync {
    /// Returns the exchange timezone used for local-day arithmetic.
    fn timezone(&self) -> Tz;

    /// Returns the sessions overlapping `range`, oldest first.
    fn sessions(&self, range: &TimeRange) -> Vec<Session>;
}

/// Calendar with a session on every weekday that is not a listed holiday.
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    hours: SessionHours,
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    /// Creates a calendar with the given session hours and no holidays.
    #[must_use]
    pub const fn new(hours: SessionHours) -> Self {
        Self {
            hours,
            holidays: BTreeSet::new(),
        }
    }

    /// Adds exchange holidays (local dates with no session).
    #[must_use]
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    /// Returns the session hours.
    #[must_use]
    pub const fn hours(&self) -> &SessionHours {
        &self.hours
    }

    /// Returns true if the local date has a session.
    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn timezone(&self) -> Tz {
        self.hours.timezone()
    }

    fn sessions(&self, range: &TimeRange) -> Vec<Session> {
        let tz = self.hours.timezone();
        let first = range.start().with_timezone(&tz).date_naive();
        let last = range.end().with_timezone(&tz).date_naive();

        first
            .iter_days()
            .take_while(|date| *date <= last)
            .filter(|date| self.is_trading_day(*date))
            .filter_map(|date| self.hours.session_on(date))
            .filter(|session| range.overlaps(session.open, session.close))
            .collect()
    }
}
