//! Paginated minute-bar fetching for exchange-traded contracts.
//!
//! This is a facade crate that re-exports functionality from the barwalk
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use barwalk_lib::prelude::*;
//! use chrono::TimeZone;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tz = SessionHours::nyse().timezone();
//! let range = TimeRange::from_zoned(
//!     tz.with_ymd_and_hms(2025, 9, 1, 9, 30, 0).unwrap(),
//!     tz.with_ymd_and_hms(2025, 9, 5, 18, 0, 0).unwrap(),
//! )?;
//!
//! let planner = WindowPlanner::new(WeekdayCalendar::default());
//! let windows = planner.plan(range, WindowSize::days(1)?)?;
//!
//! let provider = SyntheticProvider::new();
//! let fetch = execute(&Contract::stock("AAPL"), &windows, &provider, &FetchOptions::default()).await?;
//!
//! let orb = opening_range(fetch.series.bars(), 15).expect("bars fetched");
//! println!("{} bars, opening range {orb}", fetch.series.len());
//! # Ok(())
//! # }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwalk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use barwalk_types::*;

// Re-export planning
pub use barwalk_plan::{
    CalendarWindows, PlanError, TradingCalendar, WeekdayCalendar, WindowPlanner, session_windows,
};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use barwalk_fetch::{
    FetchError, FetchJob, FetchOptions, FetchProgress, GatewayConfig, GatewayProvider,
    HistoricalProvider, HistoricalRequest, ProviderError, RequestDuration, RequestPolicy,
    SymbolFetch, SyntheticProvider, WindowOutcome, execute, execute_with_progress, fetch_all,
};

/// Default base URL of a locally running gateway.
#[cfg(feature = "fetch")]
pub use barwalk_fetch::url::DEFAULT_BASE_URL as DEFAULT_GATEWAY_URL;

// Re-export reducers
#[cfg(feature = "aggregate")]
pub use barwalk_aggregate::{
    BarAggregator, Breakout, BreakoutMonitor, Direction, OpeningRange, opening_range, resample,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use barwalk_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use barwalk_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use barwalk_lib::prelude::*;
/// ```
pub mod prelude {
    pub use barwalk_types::{
        Bar, BarSize, Contract, DataKind, Series, SessionHours, TimeRange, Tz, Window, WindowSize,
        parse_local_datetime,
    };

    pub use barwalk_plan::{TradingCalendar, WeekdayCalendar, WindowPlanner};

    #[cfg(feature = "fetch")]
    pub use barwalk_fetch::{
        FetchJob, FetchOptions, GatewayConfig, GatewayProvider, HistoricalProvider,
        RequestPolicy, SyntheticProvider, execute, fetch_all,
    };

    #[cfg(feature = "aggregate")]
    pub use barwalk_aggregate::{BreakoutMonitor, opening_range, resample};

    #[cfg(feature = "format")]
    pub use barwalk_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use barwalk_format::ParquetFormatter;
}
