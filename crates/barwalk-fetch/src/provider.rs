//! Historical data provider abstraction.

use async_trait::async_trait;
use barwalk_types::{Bar, BarSize, Contract, DataKind};
use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// Lookback covered by one historical request, ending at its end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestDuration {
    /// A number of minutes.
    Minutes(u32),
    /// A number of days (trading days when regular hours only).
    Days(u32),
}

impl RequestDuration {
    /// Returns the duration as a time delta.
    #[must_use]
    pub fn delta(&self) -> TimeDelta {
        match self {
            Self::Minutes(n) => TimeDelta::minutes(i64::from(*n)),
            Self::Days(n) => TimeDelta::days(i64::from(*n)),
        }
    }

    /// Returns the duration in gateway period notation (`30min`, `1d`).
    #[must_use]
    pub fn period(&self) -> String {
        match self {
            Self::Minutes(n) => format!("{n}min"),
            Self::Days(n) => format!("{n}d"),
        }
    }

    /// Returns the shortest duration reaching back over `span`.
    ///
    /// Spans under a day are rounded up to whole minutes, longer spans to
    /// whole days. A 25-hour DST day or a session batch straddling a weekend
    /// therefore asks for more days than its nominal size.
    #[must_use]
    pub fn covering(span: TimeDelta) -> Self {
        const MINUTE: i64 = 60;
        const DAY: i64 = 24 * 60 * MINUTE;

        let secs = span.num_seconds().max(1) + i64::from(span.subsec_nanos() > 0);
        let whole = |unit: i64| u32::try_from((secs + unit - 1) / unit).unwrap_or(u32::MAX);
        if secs < DAY {
            Self::Minutes(whole(MINUTE))
        } else {
            Self::Days(whole(DAY))
        }
    }
}

impl std::fmt::Display for RequestDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minutes(n) => write!(f, "{} S", u64::from(*n) * 60),
            Self::Days(n) => write!(f, "{n} D"),
        }
    }
}

/// Parameters of one historical bar request.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRequest {
    /// Contract to request bars for.
    pub contract: Contract,
    /// End of the requested period; `None` means now.
    pub end_time: Option<DateTime<Utc>>,
    /// Lookback from `end_time`.
    pub duration: RequestDuration,
    /// Bar interval.
    pub bar_size: BarSize,
    /// Price series to build bars from.
    pub data_kind: DataKind,
    /// Restrict to regular trading hours.
    pub regular_hours_only: bool,
}

impl HistoricalRequest {
    /// Creates a request for the most recent `duration` of 1-minute trade bars
    /// during regular hours.
    #[must_use]
    pub fn latest(contract: Contract, duration: RequestDuration) -> Self {
        Self {
            contract,
            end_time: None,
            duration,
            bar_size: BarSize::Minute1,
            data_kind: DataKind::Trades,
            regular_hours_only: true,
        }
    }

    /// Sets the end time.
    #[must_use]
    pub fn ending_at(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Sets the bar size.
    #[must_use]
    pub fn with_bar_size(mut self, bar_size: BarSize) -> Self {
        self.bar_size = bar_size;
        self
    }
}

impl std::fmt::Display for HistoricalRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = self
            .end_time
            .map_or_else(|| "now".to_string(), |t| t.format("%Y%m%d %H:%M:%S").to_string());
        write!(
            f,
            "{} {} ending {} bar={} what={} rth={}",
            self.contract, self.duration, end, self.bar_size, self.data_kind, self.regular_hours_only
        )
    }
}

/// Errors that can occur within a provider implementation.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error status.
    #[error("Server error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// The brokerage session is not authenticated.
    #[error("Not authenticated with the brokerage gateway")]
    Unauthorized,

    /// The symbol could not be resolved to a contract.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The provider is temporarily unable to serve the request.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Returns true if repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && (e.is_timeout() || e.is_connect() || e.is_request()),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Unavailable(_) => true,
            Self::Unauthorized | Self::UnknownSymbol(_) | Self::Decode(_) => false,
        }
    }
}

/// A source of historical bars.
///
/// Implementations own connection lifecycle, authentication and any
/// provider-side pacing. Each call is one request; callers are expected to
/// keep at most one request in flight per symbol.
#[async_trait]
pub trait HistoricalProvider: Send + Sync {
    /// Requests bars for the given parameters, oldest first.
    async fn request_bars(&self, request: &HistoricalRequest) -> Result<Vec<Bar>, ProviderError>;
}
