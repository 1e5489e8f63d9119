//! Reducers over stitched bar series for the barwalk minute-bar fetcher.
//!
//! - [`opening_range`] - High and low of the first bars of a session
//! - [`BreakoutMonitor`] - Reports the first close outside an opening range
//! - [`BarAggregator`] - Streaming resampling into coarser bars

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwalk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod breakout;
mod opening_range;

pub use aggregator::{BarAggregator, resample};
pub use breakout::{Breakout, BreakoutMonitor, Direction};
pub use opening_range::{OpeningRange, opening_range};
