//! Request window planning for the barwalk minute-bar fetcher.
//!
//! Providers limit how much history one request may cover, so a long range
//! is split into windows before any data is requested:
//!
//! - [`WindowPlanner`] - Plans windows for a range and [`WindowSize`](barwalk_types::WindowSize)
//! - [`CalendarWindows`] - Lazy calendar-day walk, newest window first
//! - [`session_windows`] - Batches of trading sessions
//! - [`TradingCalendar`] / [`WeekdayCalendar`] - Session sources
//!
//! # Example
//!
//! ```
//! use barwalk_plan::{WeekdayCalendar, WindowPlanner};
//! use barwalk_types::{SessionHours, TimeRange, WindowSize};
//! use chrono::TimeZone;
//!
//! let tz = SessionHours::nyse().timezone();
//! let range = TimeRange::from_zoned(
//!     tz.with_ymd_and_hms(2025, 9, 1, 9, 30, 0).unwrap(),
//!     tz.with_ymd_and_hms(2025, 9, 4, 18, 0, 0).unwrap(),
//! )
//! .unwrap();
//!
//! let planner = WindowPlanner::new(WeekdayCalendar::default());
//! let windows = planner.plan(range, WindowSize::days(1).unwrap()).unwrap();
//! assert_eq!(windows.len(), 4);
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwalk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod calendar;
mod planner;

pub use calendar::{TradingCalendar, WeekdayCalendar};
pub use planner::{CalendarWindows, WindowPlanner, session_windows};

use barwalk_types::{TimeRangeError, WindowSizeError};
use thiserror::Error;

/// Errors raised before planning when inputs violate constraints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The requested range is empty.
    #[error(transparent)]
    Range(#[from] TimeRangeError),

    /// The window size is not positive.
    #[error(transparent)]
    WindowSize(#[from] WindowSizeError),
}
