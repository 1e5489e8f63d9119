//! Bar size and data kind definitions.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed bar interval requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BarSize {
    /// 1-minute bars.
    #[default]
    #[serde(rename = "m1")]
    Minute1,
    /// 5-minute bars.
    #[serde(rename = "m5")]
    Minute5,
    /// 15-minute bars.
    #[serde(rename = "m15")]
    Minute15,
    /// 30-minute bars.
    #[serde(rename = "m30")]
    Minute30,
    /// 1-hour bars.
    #[serde(rename = "h1")]
    Hour1,
    /// Daily bars.
    #[serde(rename = "d1")]
    Day1,
}

impl BarSize {
    /// Returns the bar interval in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Day1 => 86400,
        }
    }

    /// Returns the bar interval as a time delta.
    #[must_use]
    pub const fn delta(&self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }

    /// Returns the size as a short identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "m1",
            Self::Minute5 => "m5",
            Self::Minute15 => "m15",
            Self::Minute30 => "m30",
            Self::Hour1 => "h1",
            Self::Day1 => "d1",
        }
    }

    /// Returns all available bar sizes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Day1,
        ]
    }
}

impl std::fmt::Display for BarSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BarSize {
    type Err = BarSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m1" | "1m" | "1min" | "minute" => Ok(Self::Minute1),
            "m5" | "5m" | "5min" => Ok(Self::Minute5),
            "m15" | "15m" | "15min" => Ok(Self::Minute15),
            "m30" | "30m" | "30min" => Ok(Self::Minute30),
            "h1" | "1h" | "hour" => Ok(Self::Hour1),
            "d1" | "1d" | "day" | "daily" => Ok(Self::Day1),
            _ => Err(BarSizeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid bar size string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarSizeParseError(String);

impl std::fmt::Display for BarSizeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid bar size '{}', expected one of: m1, m5, m15, m30, h1, d1",
            self.0
        )
    }
}

impl std::error::Error for BarSizeParseError {}

/// Which price series the provider should build bars from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Traded prices.
    #[default]
    Trades,
    /// Bid/ask midpoint.
    Midpoint,
    /// Bid prices.
    Bid,
    /// Ask prices.
    Ask,
}

impl DataKind {
    /// Returns the kind as an identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trades => "trades",
            Self::Midpoint => "midpoint",
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_size_seconds() {
        assert_eq!(BarSize::Minute1.seconds(), 60);
        assert_eq!(BarSize::Hour1.delta(), TimeDelta::hours(1));
        assert_eq!(BarSize::Day1.seconds(), 86400);
    }

    #[test]
    fn test_bar_size_parse() {
        assert_eq!("m1".parse::<BarSize>().unwrap(), BarSize::Minute1);
        assert_eq!("5MIN".parse::<BarSize>().unwrap(), BarSize::Minute5);
        assert_eq!("1h".parse::<BarSize>().unwrap(), BarSize::Hour1);
        assert!("tick".parse::<BarSize>().is_err());
    }

    #[test]
    fn test_bar_size_serde_names() {
        let json = serde_json::to_string(&BarSize::Minute15).unwrap();
        assert_eq!(json, "\"m15\"");
        let kind: DataKind = serde_json::from_str("\"midpoint\"").unwrap();
        assert_eq!(kind, DataKind::Midpoint);
    }
}
