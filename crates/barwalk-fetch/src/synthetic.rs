//! Deterministic offline provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use barwalk_plan::{TradingCalendar, WeekdayCalendar};
use barwalk_types::{Bar, Session, TimeRange};
use chrono::{DateTime, TimeDelta, Utc};

use crate::{HistoricalProvider, HistoricalRequest, ProviderError};

/// A provider that generates bars from a formula instead of a network.
///
/// Prices depend only on the symbol and the bar timestamp, so repeated
/// requests return identical bars. Like real providers it answers with
/// bars on both ends of the requested span, leaving boundary filtering to
/// the caller.
#[derive(Debug)]
pub struct SyntheticProvider {
    calendar: WeekdayCalendar,
    latency: Duration,
    now: Option<DateTime<Utc>>,
    requests: AtomicUsize,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticProvider {
    /// Creates a provider using the default exchange calendar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calendar: WeekdayCalendar::default(),
            latency: Duration::ZERO,
            now: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Uses the given calendar for regular-hours filtering.
    #[must_use]
    pub fn with_calendar(mut self, calendar: WeekdayCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Pins the instant used for requests without an end time.
    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Returns the number of requests served so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn generate(&self, request: &HistoricalRequest) -> Vec<Bar> {
        let end = request.end_time.or(self.now).unwrap_or_else(Utc::now);
        let start = end - request.duration.delta();
        let Ok(span) = TimeRange::new(start, end) else {
            return Vec::new();
        };

        let step = request.bar_size.seconds();
        let sessions = if request.regular_hours_only {
            self.calendar.sessions(&span)
        } else {
            Vec::new()
        };

        let first = start.timestamp().div_euclid(step) * step
            + if start.timestamp().rem_euclid(step) == 0 { 0 } else { step };
        let seed = symbol_seed(request.contract.symbol());

        (first..=end.timestamp())
            .step_by(step.unsigned_abs() as usize)
            .filter_map(|secs| DateTime::from_timestamp(secs, 0))
            .filter(|t| !request.regular_hours_only || in_session(&sessions, *t))
            .map(|t| synthetic_bar(seed, t, request.bar_size.delta()))
            .collect()
    }
}

#[async_trait]
impl HistoricalProvider for SyntheticProvider {
    async fn request_bars(&self, request: &HistoricalRequest) -> Result<Vec<Bar>, ProviderError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.generate(request))
    }
}

fn in_session(sessions: &[Session], instant: DateTime<Utc>) -> bool {
    sessions
        .iter()
        .any(|session| session.open <= instant && instant < session.close)
}

fn symbol_seed(symbol: &str) -> f64 {
    let sum: u32 = symbol.bytes().map(u32::from).sum();
    50.0 + f64::from(sum % 200)
}

fn price_at(seed: f64, instant: DateTime<Utc>) -> f64 {
    let minutes = (instant.timestamp() / 60) as f64;
    seed * (1.0 + 0.01 * (minutes / 37.0).sin() + 0.002 * (minutes / 5.3).sin())
}

fn synthetic_bar(seed: f64, timestamp: DateTime<Utc>, bar_len: TimeDelta) -> Bar {
    let open = price_at(seed, timestamp);
    let close = price_at(seed, timestamp + bar_len);
    let high = open.max(close) * 1.0005;
    let low = open.min(close) * 0.9995;
    let volume = 100.0 + ((timestamp.timestamp() / 60) * 7919 % 900) as f64;
    Bar::new(timestamp, open, high, low, close, volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestDuration;
    use barwalk_types::{BarSize, Contract};
    use chrono::TimeZone;

    fn friday_close() -> DateTime<Utc> {
        // 2025-09-05 16:00 New York
        Utc.with_ymd_and_hms(2025, 9, 5, 20, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_regular_hours_day() {
        let provider = SyntheticProvider::new();
        let request = HistoricalRequest::latest(Contract::stock("AAPL"), RequestDuration::Days(1))
            .ending_at(friday_close());
        let bars = provider.request_bars(&request).await.unwrap();

        assert_eq!(bars.len(), 390);
        assert_eq!(
            bars.first().unwrap().timestamp,
            Utc.with_ymd_and_hms(2025, 9, 5, 13, 30, 0).unwrap()
        );
        assert_eq!(
            bars.last().unwrap().timestamp,
            Utc.with_ymd_and_hms(2025, 9, 5, 19, 59, 0).unwrap()
        );
        assert!(bars.iter().all(|bar| bar.validate().is_ok()));
        assert_eq!(provider.requests(), 1);
    }

    #[tokio::test]
    async fn test_outside_hours_includes_both_ends() {
        let provider = SyntheticProvider::new();
        let mut request =
            HistoricalRequest::latest(Contract::stock("AAPL"), RequestDuration::Minutes(10))
                .ending_at(friday_close());
        request.regular_hours_only = false;
        let bars = provider.request_bars(&request).await.unwrap();

        assert_eq!(bars.len(), 11);
        assert_eq!(bars.last().unwrap().timestamp, friday_close());
    }

    #[tokio::test]
    async fn test_deterministic_per_symbol() {
        let provider = SyntheticProvider::new();
        let aapl = HistoricalRequest::latest(Contract::stock("AAPL"), RequestDuration::Days(1))
            .ending_at(friday_close());
        let mut msft = aapl.clone();
        msft.contract = Contract::stock("MSFT");

        let first = provider.request_bars(&aapl).await.unwrap();
        let second = provider.request_bars(&aapl).await.unwrap();
        let other = provider.request_bars(&msft).await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first[0].close, other[0].close);
    }

    #[tokio::test]
    async fn test_weekend_is_empty() {
        let provider = SyntheticProvider::new();
        let sunday = Utc.with_ymd_and_hms(2025, 9, 7, 20, 0, 0).unwrap();
        let request = HistoricalRequest::latest(Contract::stock("AAPL"), RequestDuration::Days(1))
            .ending_at(sunday);
        assert!(provider.request_bars(&request).await.unwrap().is_empty());
    }

    #[test]
    fn test_bar_size_grid() {
        let provider = SyntheticProvider::new().with_now(friday_close());
        let request = HistoricalRequest::latest(Contract::stock("SPY"), RequestDuration::Days(1))
            .with_bar_size(BarSize::Minute5);
        let bars = provider.generate(&request);

        assert_eq!(bars.len(), 78);
        assert!(bars.iter().all(|bar| bar.timestamp.timestamp() % 300 == 0));
    }
}
