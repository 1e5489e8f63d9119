//! Chronologically ordered bar series.

use chrono::{DateTime, Utc};

use crate::{Bar, SeriesError};

/// An ordered sequence of bars, strictly increasing by timestamp.
///
/// Series are built newest-block-first: each call to [`Series::prepend`]
/// places an older block in front of the bars already held. Each prepend
/// shifts the held bars; stitch many blocks with [`SeriesBuilder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Builds a series from bars that are already in order.
    ///
    /// # Errors
    ///
    /// Returns an error if timestamps are not strictly increasing.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        check_strictly_increasing(&bars)?;
        Ok(Self { bars })
    }

    /// Places an older block of bars in front of the series.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not strictly increasing or if its
    /// last bar is not strictly before the current first bar. The series is
    /// left unchanged on error.
    pub fn prepend(&mut self, block: Vec<Bar>) -> Result<(), SeriesError> {
        check_strictly_increasing(&block)?;

        if let (Some(last), Some(first)) = (block.last(), self.bars.first())
            && last.timestamp >= first.timestamp
        {
            return Err(SeriesError::OutOfOrder {
                previous: last.timestamp,
                next: first.timestamp,
            });
        }

        self.bars.splice(0..0, block);
        Ok(())
    }

    /// Returns the bars as a slice.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Consumes the series, returning its bars.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if the series holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the oldest bar.
    #[must_use]
    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// Returns the newest bar.
    #[must_use]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Returns the timestamps of the oldest and newest bars.
    #[must_use]
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }
}

impl AsRef<[Bar]> for Series {
    fn as_ref(&self) -> &[Bar] {
        &self.bars
    }
}

/// Collects newest-first blocks and joins them into a [`Series`] once.
///
/// Accepts the same blocks as [`Series::prepend`] with the same ordering
/// checks, without moving already held bars.
#[derive(Debug, Clone, Default)]
pub struct SeriesBuilder {
    blocks: Vec<Vec<Bar>>,
    len: usize,
}

impl SeriesBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Adds a block older than every block added so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not strictly increasing or if its
    /// last bar is not strictly before the oldest bar held. The builder is
    /// left unchanged on error.
    pub fn prepend(&mut self, block: Vec<Bar>) -> Result<(), SeriesError> {
        check_strictly_increasing(&block)?;

        // Empty blocks are never stored, so the last block holds the head.
        let head = self.blocks.last().and_then(|b| b.first());
        if let (Some(last), Some(first)) = (block.last(), head)
            && last.timestamp >= first.timestamp
        {
            return Err(SeriesError::OutOfOrder {
                previous: last.timestamp,
                next: first.timestamp,
            });
        }

        if !block.is_empty() {
            self.len += block.len();
            self.blocks.push(block);
        }
        Ok(())
    }

    /// Returns the number of bars collected.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bars have been collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Joins the blocks oldest-first.
    #[must_use]
    pub fn finish(self) -> Series {
        let mut bars = Vec::with_capacity(self.len);
        for block in self.blocks.into_iter().rev() {
            bars.extend(block);
        }
        Series { bars }
    }
}

fn check_strictly_increasing(bars: &[Bar]) -> Result<(), SeriesError> {
    match bars
        .windows(2)
        .find(|pair| pair[0].timestamp >= pair[1].timestamp)
    {
        Some(pair) => Err(SeriesError::OutOfOrder {
            previous: pair[0].timestamp,
            next: pair[1].timestamp,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn bar_at(minute: i64) -> Bar {
        let base = Utc.with_ymd_and_hms(2025, 9, 2, 13, 30, 0).unwrap();
        Bar::new(base + TimeDelta::minutes(minute), 1.0, 1.0, 1.0, 1.0, 1.0)
    }

    fn minutes(series: &Series) -> Vec<i64> {
        let base = Utc.with_ymd_and_hms(2025, 9, 2, 13, 30, 0).unwrap();
        series
            .bars()
            .iter()
            .map(|b| (b.timestamp - base).num_minutes())
            .collect()
    }

    #[test]
    fn test_prepend_builds_chronological_order() {
        let mut series = Series::new();
        series.prepend(vec![bar_at(4), bar_at(5)]).unwrap();
        series.prepend(vec![]).unwrap();
        series.prepend(vec![bar_at(1), bar_at(2), bar_at(3)]).unwrap();

        assert_eq!(minutes(&series), vec![1, 2, 3, 4, 5]);
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_prepend_rejects_overlap() {
        let mut series = Series::new();
        series.prepend(vec![bar_at(4), bar_at(5)]).unwrap();

        let err = series.prepend(vec![bar_at(3), bar_at(4)]).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { .. }));
        assert_eq!(minutes(&series), vec![4, 5]);
    }

    #[test]
    fn test_prepend_rejects_unordered_block() {
        let mut series = Series::new();
        assert!(series.prepend(vec![bar_at(2), bar_at(1)]).is_err());
        assert!(series.is_empty());
    }

    #[test]
    fn test_from_bars_rejects_duplicates() {
        assert!(Series::from_bars(vec![bar_at(1), bar_at(1)]).is_err());
        let series = Series::from_bars(vec![bar_at(1), bar_at(2)]).unwrap();
        let (first, last) = series.span().unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_builder_matches_repeated_prepend() {
        let blocks = [
            vec![bar_at(7), bar_at(8)],
            vec![],
            vec![bar_at(4), bar_at(5), bar_at(6)],
            vec![bar_at(1)],
        ];

        let mut series = Series::new();
        let mut builder = SeriesBuilder::new();
        for block in &blocks {
            series.prepend(block.clone()).unwrap();
            builder.prepend(block.clone()).unwrap();
        }

        assert_eq!(builder.len(), 6);
        assert_eq!(builder.finish(), series);
    }

    #[test]
    fn test_builder_rejects_overlap_across_empty_block() {
        let mut builder = SeriesBuilder::new();
        builder.prepend(vec![bar_at(4), bar_at(5)]).unwrap();
        builder.prepend(vec![]).unwrap();

        let err = builder.prepend(vec![bar_at(3), bar_at(4)]).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { .. }));
        assert!(builder.prepend(vec![bar_at(2), bar_at(1)]).is_err());
        assert_eq!(minutes(&builder.finish()), vec![4, 5]);
    }
}
