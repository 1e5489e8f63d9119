//! Fetch errors.

use barwalk_types::{SeriesError, Window};
use thiserror::Error;

use crate::ProviderError;

/// Errors that abort one symbol's fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The provider failed and the failure was not retryable, or retries ran out.
    #[error("Request for window {window} failed: {source}")]
    Provider {
        /// The window being requested.
        window: Window,
        /// The provider failure.
        source: ProviderError,
    },

    /// Every attempt hit the per-request timeout.
    #[error("Request for window {window} timed out after {attempts} attempts")]
    Timeout {
        /// The window being requested.
        window: Window,
        /// Number of calls made.
        attempts: u32,
    },

    /// Filtered bars could not be stitched in chronological order.
    #[error("Bars for window {window} break chronological order: {source}")]
    Stitch {
        /// The window whose bars were rejected.
        window: Window,
        /// The ordering violation.
        source: SeriesError,
    },
}

impl FetchError {
    /// Returns the window the failure occurred in.
    #[must_use]
    pub const fn window(&self) -> &Window {
        match self {
            Self::Provider { window, .. }
            | Self::Timeout { window, .. }
            | Self::Stitch { window, .. } => window,
        }
    }
}
