//! JSON output format.

use barwalk_types::Bar;
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// JSON array (standard JSON).
    #[default]
    Array,
    /// Newline-delimited JSON (NDJSON/JSONL), one bar per line.
    Ndjson,
}

/// JSON formatter. Timestamps serialize as RFC 3339 UTC strings.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    style: JsonStyle,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default settings (array style).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Sets whether to pretty-print output (array style only).
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Returns the output style.
    #[must_use]
    pub const fn style(&self) -> JsonStyle {
        self.style
    }
}

impl Formatter for JsonFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array if self.pretty => serde_json::to_writer_pretty(&mut writer, bars)?,
            JsonStyle::Array => serde_json::to_writer(&mut writer, bars)?,
            JsonStyle::Ndjson => {
                for bar in bars {
                    serde_json::to_writer(&mut writer, bar)?;
                    writeln!(writer)?;
                }
                return Ok(writer.flush()?);
            }
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn bar() -> Bar {
        let timestamp = Utc.with_ymd_and_hms(2025, 9, 4, 13, 30, 0).unwrap();
        Bar::new(timestamp, 189.5, 190.1, 189.4, 189.9, 1520.0)
    }

    fn render(formatter: &JsonFormatter, bars: &[Bar]) -> String {
        let mut output = Cursor::new(Vec::new());
        formatter.write_bars(bars, &mut output).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn test_json_array() {
        let result = render(&JsonFormatter::new(), &[bar()]);
        assert!(result.starts_with('['));
        assert!(result.contains("\"high\":190.1"));
        assert!(result.contains("\"timestamp\":\"2025-09-04T13:30:00Z\""));

        let parsed: Vec<Bar> = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, vec![bar()]);
    }

    #[test]
    fn test_ndjson() {
        let formatter = JsonFormatter::ndjson();
        let result = render(&formatter, &[bar(), bar()]);
        let lines: Vec<_> = result.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('{'));
        assert_eq!(formatter.extension(), "ndjson");
    }

    #[test]
    fn test_pretty_json() {
        let result = render(&JsonFormatter::new().with_pretty(true), &[bar()]);
        assert!(result.contains("  \"open\""));
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(render(&JsonFormatter::new(), &[]), "[]\n");
    }
}
