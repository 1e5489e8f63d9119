//! CSV output format.

use barwalk_types::{Bar, Tz};
use std::io::Write;

use crate::{FormatError, Formatter};

/// Column names, in output order.
const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// CSV formatter.
///
/// Dates are written as UTC RFC 3339 unless an exchange timezone is set, in
/// which case they are rendered as local wall-clock time with the offset
/// (`2025-09-04 09:30:00-04:00`).
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    delimiter: char,
    include_header: bool,
    timezone: Option<Tz>,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
            timezone: None,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Renders dates in the given exchange timezone.
    #[must_use]
    pub const fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }

    fn format_date(&self, bar: &Bar) -> String {
        match self.timezone {
            Some(tz) => bar
                .timestamp
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M:%S%:z")
                .to_string(),
            None => bar.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

impl Formatter for CsvFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "{}", COLUMNS.join(&d.to_string()))?;
        }

        for bar in bars {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                self.format_date(bar),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn bars() -> Vec<Bar> {
        let open = Utc.with_ymd_and_hms(2025, 9, 4, 13, 30, 0).unwrap();
        vec![
            Bar::new(open, 189.5, 190.1, 189.4, 189.9, 1520.0),
            Bar::new(open + chrono::TimeDelta::minutes(1), 189.9, 190.3, 189.8, 190.2, 980.0),
        ]
    }

    fn render(formatter: &CsvFormatter) -> String {
        let mut output = Cursor::new(Vec::new());
        formatter.write_bars(&bars(), &mut output).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn test_csv_bars() {
        let result = render(&CsvFormatter::new());
        let lines: Vec<_> = result.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,open,high,low,close,volume");
        assert_eq!(lines[1], "2025-09-04T13:30:00Z,189.5,190.1,189.4,189.9,1520");
    }

    #[test]
    fn test_csv_exchange_timezone() {
        let result = render(&CsvFormatter::new().with_timezone(Tz::America__New_York));
        assert!(result.contains("2025-09-04 09:30:00-04:00,189.5"));
        assert!(result.contains("2025-09-04 09:31:00-04:00,189.9"));
    }

    #[test]
    fn test_csv_no_header() {
        let result = render(&CsvFormatter::new().with_header(false));
        assert!(!result.contains("date,open"));
        assert_eq!(result.lines().count(), 2);
    }

    #[test]
    fn test_tsv() {
        let formatter = CsvFormatter::tsv();
        let result = render(&formatter);
        assert!(result.starts_with("date\topen\thigh"));
        assert_eq!(formatter.extension(), "tsv");
    }

    #[test]
    fn test_empty_series_writes_header_only() {
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::new().write_bars(&[], &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output.into_inner()).unwrap(),
            "date,open,high,low,close,volume\n"
        );
    }
}
