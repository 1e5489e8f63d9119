//! Streaming resampling of bars into a coarser bar size.

use barwalk_types::{Bar, BarSize, Tz};
use chrono::{DateTime, TimeZone, Utc};

/// Streaming bar aggregator.
///
/// Folds ordered bars into buckets of the configured size. Intraday buckets
/// are aligned to the epoch; daily buckets follow the exchange-local date and
/// are stamped with local midnight.
#[derive(Debug)]
pub struct BarAggregator {
    bar_size: BarSize,
    tz: Tz,
    current: Option<Bar>,
}

impl BarAggregator {
    /// Creates a new aggregator for the given bar size and exchange timezone.
    #[must_use]
    pub const fn new(bar_size: BarSize, tz: Tz) -> Self {
        Self {
            bar_size,
            tz,
            current: None,
        }
    }

    /// Returns the bar size being aggregated to.
    #[must_use]
    pub const fn bar_size(&self) -> BarSize {
        self.bar_size
    }

    /// Processes a bar, potentially emitting a completed one.
    ///
    /// Returns `Some(bar)` when this bar starts a new bucket, `None` otherwise.
    pub fn process(&mut self, bar: Bar) -> Option<Bar> {
        let bucket = self.bucket_start(bar.timestamp);

        match self.current.take() {
            Some(mut open) if open.timestamp == bucket => {
                open.high = open.high.max(bar.high);
                open.low = open.low.min(bar.low);
                open.close = bar.close;
                open.volume += bar.volume;
                self.current = Some(open);
                None
            }
            Some(completed) => {
                self.current = Some(Bar { timestamp: bucket, ..bar });
                Some(completed)
            }
            None => {
                self.current = Some(Bar { timestamp: bucket, ..bar });
                None
            }
        }
    }

    /// Finishes aggregation, returning any remaining partial bar.
    #[must_use]
    pub const fn finish(self) -> Option<Bar> {
        self.current
    }

    fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        match self.bar_size {
            BarSize::Day1 => local_midnight(timestamp, self.tz),
            size => {
                let secs = timestamp.timestamp();
                let aligned = secs - secs.rem_euclid(size.seconds());
                DateTime::from_timestamp(aligned, 0).unwrap_or(timestamp)
            }
        }
    }
}

/// Resamples ordered bars into `bar_size` buckets.
#[must_use]
pub fn resample(bars: &[Bar], bar_size: BarSize, tz: Tz) -> Vec<Bar> {
    let mut aggregator = BarAggregator::new(bar_size, tz);
    let mut out: Vec<Bar> = bars.iter().filter_map(|bar| aggregator.process(*bar)).collect();
    out.extend(aggregator.finish());
    out
}

fn local_midnight(timestamp: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let date = timestamp.with_timezone(&tz).date_naive();
    tz.from_local_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .earliest()
        .map_or(timestamp, |local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, Timelike};

    fn minute_bars(start: DateTime<Utc>, count: i64) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let p = 100.0 + i as f64;
                Bar::new(start + TimeDelta::minutes(i), p, p + 0.5, p - 0.5, p + 0.25, 10.0)
            })
            .collect()
    }

    #[test]
    fn test_five_minute_resample() {
        let open = Utc.with_ymd_and_hms(2025, 9, 5, 13, 30, 0).unwrap();
        let bars = minute_bars(open, 12);
        let out = resample(&bars, BarSize::Minute5, Tz::America__New_York);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].timestamp, open);
        assert_relative_eq!(out[0].open, 100.0);
        assert_relative_eq!(out[0].high, 104.5);
        assert_relative_eq!(out[0].low, 99.5);
        assert_relative_eq!(out[0].close, 104.25);
        assert_relative_eq!(out[0].volume, 50.0);

        // Trailing partial bucket.
        assert_eq!(out[2].timestamp.minute(), 40);
        assert_relative_eq!(out[2].volume, 20.0);
    }

    #[test]
    fn test_unaligned_start() {
        let start = Utc.with_ymd_and_hms(2025, 9, 5, 13, 33, 0).unwrap();
        let out = resample(&minute_bars(start, 4), BarSize::Minute5, Tz::UTC);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp.minute(), 30);
        assert_relative_eq!(out[0].volume, 20.0);
        assert_eq!(out[1].timestamp.minute(), 35);
    }

    #[test]
    fn test_daily_buckets_follow_exchange_date() {
        // 19:59 New York on Sep 4 is 23:59 UTC; 00:01 UTC Sep 5 is still Sep 4 locally.
        let late = Utc.with_ymd_and_hms(2025, 9, 4, 23, 59, 0).unwrap();
        let bars = vec![
            Bar::new(late, 1.0, 2.0, 0.5, 1.5, 1.0),
            Bar::new(late + TimeDelta::minutes(2), 1.5, 3.0, 1.0, 2.5, 1.0),
        ];

        let out = resample(&bars, BarSize::Day1, Tz::America__New_York);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].timestamp,
            Utc.with_ymd_and_hms(2025, 9, 4, 4, 0, 0).unwrap()
        );
        assert_relative_eq!(out[0].high, 3.0);

        let utc = resample(&bars, BarSize::Day1, Tz::UTC);
        assert_eq!(utc.len(), 2);
    }

    #[test]
    fn test_finish_empty() {
        let agg = BarAggregator::new(BarSize::Hour1, Tz::UTC);
        assert!(agg.finish().is_none());
    }
}
