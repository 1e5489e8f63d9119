//! Output sinks for the barwalk minute-bar fetcher.
//!
//! This crate writes stitched bar series to various output formats:
//!
//! - [`CsvFormatter`] - CSV format (`date,open,high,low,close,volume`)
//! - [`JsonFormatter`] - JSON array or NDJSON format
//! - [`ParquetFormatter`] - Apache Parquet columnar format

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwalk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

#[cfg(feature = "parquet")]
mod parquet;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetFormatter;
