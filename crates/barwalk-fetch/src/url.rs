//! Brokerage gateway endpoint construction.

use barwalk_types::{BarSize, Contract};
use chrono::{DateTime, Utc};

use crate::HistoricalRequest;

/// Default base URL of a locally running Client Portal gateway.
pub const DEFAULT_BASE_URL: &str = "https://localhost:5000/v1/api";

/// Format of the `startTime` query parameter, in UTC.
const GATEWAY_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S";

/// Builds the contract search endpoint.
///
/// # Example
///
/// ```
/// use barwalk_fetch::url::search_url;
///
/// let url = search_url("https://localhost:5000/v1/api/");
/// assert_eq!(url, "https://localhost:5000/v1/api/iserver/secdef/search");
/// ```
#[must_use]
pub fn search_url(base: &str) -> String {
    format!("{}/iserver/secdef/search", base.trim_end_matches('/'))
}

/// Builds the historical market data endpoint.
#[must_use]
pub fn history_url(base: &str) -> String {
    format!("{}/iserver/marketdata/history", base.trim_end_matches('/'))
}

/// Builds the session status endpoint.
#[must_use]
pub fn auth_status_url(base: &str) -> String {
    format!("{}/iserver/auth/status", base.trim_end_matches('/'))
}

/// Query parameters for a contract search.
#[must_use]
pub fn search_query(contract: &Contract) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", contract.symbol().to_string()),
        ("secType", contract.sec_type().as_str().to_string()),
    ]
}

/// Query parameters for a historical bar request against a resolved conid.
#[must_use]
pub fn history_query(conid: &str, request: &HistoricalRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("conid", conid.to_string()),
        ("period", request.duration.period()),
        ("bar", gateway_bar(request.bar_size).to_string()),
        ("outsideRth", (!request.regular_hours_only).to_string()),
        ("source", request.data_kind.as_str().to_string()),
    ];
    if let Some(end) = request.end_time {
        query.push(("startTime", gateway_time(end)));
    }
    query
}

/// Formats an instant the way the gateway expects.
#[must_use]
pub fn gateway_time(instant: DateTime<Utc>) -> String {
    instant.format(GATEWAY_TIME_FORMAT).to_string()
}

/// Returns the gateway notation for a bar size.
#[must_use]
pub const fn gateway_bar(bar_size: BarSize) -> &'static str {
    match bar_size {
        BarSize::Minute1 => "1min",
        BarSize::Minute5 => "5min",
        BarSize::Minute15 => "15min",
        BarSize::Minute30 => "30min",
        BarSize::Hour1 => "1h",
        BarSize::Day1 => "1d",
    }
}
