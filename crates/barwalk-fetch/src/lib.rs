//! Provider access and fetch-and-stitch execution for the barwalk minute-bar fetcher.
//!
//! This crate turns planned windows into a stitched series:
//!
//! - [`HistoricalProvider`] - One request for bars ending at a given time
//! - [`GatewayProvider`] - Brokerage Client Portal gateway over HTTPS
//! - [`SyntheticProvider`] - Deterministic offline bars
//! - [`execute`] - Sequential per-window fetch, boundary filtering and stitching
//! - [`fetch_all`] - Bounded concurrency across symbols
//! - [`url`] - Gateway endpoint construction

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barwalk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod executor;
mod fanout;
mod policy;
mod provider;
mod synthetic;
pub mod url;

pub use client::{GatewayConfig, GatewayProvider};
pub use error::FetchError;
pub use executor::{
    FetchOptions, FetchProgress, SymbolFetch, WindowOutcome, execute, execute_with_progress,
};
pub use fanout::{FetchJob, fetch_all};
pub use policy::RequestPolicy;
pub use provider::{HistoricalProvider, HistoricalRequest, ProviderError, RequestDuration};
pub use synthetic::SyntheticProvider;
