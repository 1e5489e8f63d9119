//! Apache Parquet output format.

use arrow::array::{ArrayRef, Float64Array, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use barwalk_types::Bar;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;

use crate::{FormatError, Formatter};

/// Parquet formatter.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Creates the Arrow schema for bar data.
    fn bar_schema() -> SchemaRef {
        let timestamp = DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()));
        let mut fields = vec![Field::new("date", timestamp, false)];
        fields.extend(
            ["open", "high", "low", "close", "volume"]
                .into_iter()
                .map(|name| Field::new(name, DataType::Float64, false)),
        );
        Arc::new(Schema::new(fields))
    }

    /// Converts bars to an Arrow record batch.
    fn bars_to_batch(schema: &SchemaRef, bars: &[Bar]) -> Result<RecordBatch, FormatError> {
        let column = |f: fn(&Bar) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from_iter_values(bars.iter().map(f)))
        };
        let timestamps = TimestampMicrosecondArray::from_iter_values(
            bars.iter().map(|b| b.timestamp.timestamp_micros()),
        )
        .with_timezone("UTC");

        RecordBatch::try_new(
            Arc::clone(schema),
            vec![
                Arc::new(timestamps),
                column(|b| b.open),
                column(|b| b.high),
                column(|b| b.low),
                column(|b| b.close),
                column(|b| b.volume),
            ],
        )
        .map_err(|e| FormatError::Parquet(e.to_string()))
    }
}

impl Formatter for ParquetFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], writer: W) -> Result<(), FormatError> {
        let schema = Self::bar_schema();
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut arrow_writer = ArrowWriter::try_new(writer, Arc::clone(&schema), Some(props))
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        for chunk in bars.chunks(self.row_group_size.max(1)) {
            let batch = Self::bars_to_batch(&schema, chunk)?;
            arrow_writer
                .write(&batch)
                .map_err(|e| FormatError::Parquet(e.to_string()))?;
        }

        arrow_writer
            .close()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        Ok(())
    }

    fn extension(&self) -> &str {
        "parquet"
    }
}
