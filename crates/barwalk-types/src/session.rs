//! Trading sessions and exchange hours.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const NYSE_OPEN: NaiveTime = match NaiveTime::from_hms_opt(9, 30, 0) {
    Some(t) => t,
    None => unreachable!(),
};

const NYSE_CLOSE: NaiveTime = match NaiveTime::from_hms_opt(16, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

/// Fixed local open and close times of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHours {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

impl Default for SessionHours {
    fn default() -> Self {
        Self::nyse()
    }
}

impl SessionHours {
    /// Creates session hours, returning `None` unless `open < close`.
    #[must_use]
    pub fn new(tz: Tz, open: NaiveTime, close: NaiveTime) -> Option<Self> {
        (open < close).then_some(Self { tz, open, close })
    }

    /// US equity regular trading hours: 09:30-16:00 America/New_York.
    #[must_use]
    pub const fn nyse() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
            open: NYSE_OPEN,
            close: NYSE_CLOSE,
        }
    }

    /// Returns a copy with a different exchange timezone.
    #[must_use]
    pub const fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Returns the exchange timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Returns the local open time.
    #[must_use]
    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    /// Returns the local close time.
    #[must_use]
    pub const fn close(&self) -> NaiveTime {
        self.close
    }

    /// Returns the session held on the given local date.
    ///
    /// Returns `None` if either boundary falls in a DST gap.
    #[must_use]
    pub fn session_on(&self, date: NaiveDate) -> Option<Session> {
        let open = self.tz.from_local_datetime(&date.and_time(self.open)).earliest()?;
        let close = self.tz.from_local_datetime(&date.and_time(self.close)).earliest()?;
        Some(Session {
            open: open.with_timezone(&Utc),
            close: close.with_timezone(&Utc),
        })
    }
}

/// A single trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Session {
    /// Session open (UTC).
    pub open: DateTime<Utc>,
    /// Session close (UTC).
    pub close: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_nyse_session_summer_and_winter() {
        let hours = SessionHours::nyse();

        let summer = hours
            .session_on(NaiveDate::from_ymd_opt(2025, 9, 2).unwrap())
            .unwrap();
        assert_eq!(summer.open.hour(), 13);
        assert_eq!(summer.open.minute(), 30);
        assert_eq!(summer.close.hour(), 20);

        let winter = hours
            .session_on(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
            .unwrap();
        assert_eq!(winter.open.hour(), 14);
        assert_eq!(winter.close.hour(), 21);
    }

    #[test]
    fn test_new_requires_open_before_close() {
        let open = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        let close = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert!(SessionHours::new(chrono_tz::UTC, open, close).is_none());
        assert!(SessionHours::new(chrono_tz::UTC, close, open).is_some());
    }
}
