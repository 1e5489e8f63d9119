//! Core types for the barwalk minute-bar fetcher.
//!
//! This crate provides the fundamental data structures used throughout barwalk:
//!
//! - [`Bar`] - A single OHLCV observation
//! - [`Series`] - Strictly increasing sequence of bars
//! - [`SeriesBuilder`] - Joins newest-first blocks into a [`Series`]
//! - [`TimeRange`] - Half-open range for data retrieval
//! - [`Window`] / [`WindowSize`] - One planned provider request
//! - [`Contract`] - The traded instrument a request is made for
//! - [`BarSize`] / [`DataKind`] - Request shape
//! - [`SessionHours`] / [`Session`] - Exchange trading hours

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwalk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod bar_size;
mod contract;
mod error;
mod series;
mod session;
mod time_range;
mod window;

pub use bar::Bar;
pub use bar_size::{BarSize, BarSizeParseError, DataKind};
pub use contract::{Contract, SecType};
pub use error::{BarError, SeriesError, TimeParseError, TimeRangeError, WindowSizeError};
pub use series::{Series, SeriesBuilder};
pub use session::{Session, SessionHours};
pub use time_range::{TimeRange, parse_local_datetime};
pub use window::{Window, WindowSize};

pub use chrono_tz::Tz;
