//! Fetch-and-stitch execution over planned windows.

use std::time::{Duration, Instant};

use barwalk_types::{Bar, BarSize, Contract, DataKind, Series, SeriesBuilder, Window};

use crate::{
    FetchError, HistoricalProvider, HistoricalRequest, ProviderError, RequestDuration,
    RequestPolicy,
};

/// Request shape and policy shared by every window of a fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Bar interval.
    pub bar_size: BarSize,
    /// Price series to build bars from.
    pub data_kind: DataKind,
    /// Restrict to regular trading hours.
    pub regular_hours_only: bool,
    /// Drop bars whose prices fail [`Bar::validate`].
    pub validate_bars: bool,
    /// Timeout and retry policy per request.
    pub policy: RequestPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            bar_size: BarSize::Minute1,
            data_kind: DataKind::Trades,
            regular_hours_only: true,
            validate_bars: true,
            policy: RequestPolicy::default(),
        }
    }
}

impl FetchOptions {
    /// Builds the single provider request for a window.
    ///
    /// The lookback covers the window's actual span, which can exceed its
    /// nominal size.
    #[must_use]
    pub fn request_for(&self, contract: &Contract, window: &Window) -> HistoricalRequest {
        HistoricalRequest {
            contract: contract.clone(),
            end_time: Some(window.chunk_end()),
            duration: RequestDuration::covering(window.span()),
            bar_size: self.bar_size,
            data_kind: self.data_kind,
            regular_hours_only: self.regular_hours_only,
        }
    }
}

/// What one window contributed to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOutcome {
    /// The requested window.
    pub window: Window,
    /// Bars returned by the provider.
    pub received: usize,
    /// Bars kept after filtering.
    pub kept: usize,
    /// Bars outside `[chunk_start, chunk_end)`.
    pub outside: usize,
    /// Bars dropped by validation.
    pub rejected: usize,
    /// Provider calls made for this window.
    pub attempts: u32,
}

impl WindowOutcome {
    /// Returns true if the window contributed no bars.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kept == 0
    }
}

/// The stitched result of one symbol's fetch.
#[derive(Debug, Clone)]
pub struct SymbolFetch {
    /// The fetched contract.
    pub contract: Contract,
    /// Chronological bars across all windows.
    pub series: Series,
    /// Per-window outcomes, in planned order.
    pub windows: Vec<WindowOutcome>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl SymbolFetch {
    /// Returns the windows that contributed no bars.
    pub fn empty_windows(&self) -> impl Iterator<Item = &WindowOutcome> {
        self.windows.iter().filter(|outcome| outcome.is_empty())
    }

    /// Returns the total number of bars dropped by validation.
    #[must_use]
    pub fn rejected_bars(&self) -> usize {
        self.windows.iter().map(|outcome| outcome.rejected).sum()
    }
}

/// Observer notified as a fetch makes progress.
pub trait FetchProgress: Sync {
    /// Called after each window has been stitched.
    fn window_done(&self, _contract: &Contract, _outcome: &WindowOutcome) {}
}

impl FetchProgress for () {}

/// Fetches and stitches all windows for one contract.
///
/// Windows are requested one at a time in planned (newest-first) order. Each
/// window's bars are filtered to its half-open interval and prepended, so the
/// series ends up oldest-first without sorting. A window with no bars is
/// recorded and skipped.
///
/// # Errors
///
/// Returns an error, abandoning the remaining windows, if a request fails
/// after the retry policy is exhausted or if stitched bars are out of order.
pub async fn execute<P>(
    contract: &Contract,
    windows: &[Window],
    provider: &P,
    options: &FetchOptions,
) -> Result<SymbolFetch, FetchError>
where
    P: HistoricalProvider + ?Sized,
{
    execute_with_progress(contract, windows, provider, options, &()).await
}

/// Same as [`execute`], reporting each completed window to `progress`.
///
/// # Errors
///
/// See [`execute`].
#[tracing::instrument(name = "fetch", skip_all, fields(symbol = %contract, windows = windows.len()))]
pub async fn execute_with_progress<P>(
    contract: &Contract,
    windows: &[Window],
    provider: &P,
    options: &FetchOptions,
    progress: &(impl FetchProgress + ?Sized),
) -> Result<SymbolFetch, FetchError>
where
    P: HistoricalProvider + ?Sized,
{
    let started = Instant::now();
    let mut series = SeriesBuilder::new();
    let mut outcomes = Vec::with_capacity(windows.len());

    for window in windows {
        let request = options.request_for(contract, window);
        tracing::debug!(%window, request = %request, "requesting window");

        let (bars, attempts) = request_with_retry(provider, &request, window, &options.policy).await?;
        let received = bars.len();
        let filtered = filter_window(bars, window, options.validate_bars);

        let outcome = WindowOutcome {
            window: *window,
            received,
            kept: filtered.bars.len(),
            outside: filtered.outside,
            rejected: filtered.rejected,
            attempts,
        };

        if outcome.outside > 0 {
            tracing::debug!(%window, outside = outcome.outside, "discarded bars outside window");
        }
        if outcome.is_empty() {
            tracing::warn!(%window, received, "no bars received for window");
        }

        series
            .prepend(filtered.bars)
            .map_err(|source| FetchError::Stitch {
                window: *window,
                source,
            })?;

        progress.window_done(contract, &outcome);
        outcomes.push(outcome);
    }

    let series = series.finish();
    let elapsed = started.elapsed();
    tracing::info!(
        bars = series.len(),
        empty_windows = outcomes.iter().filter(|o| o.is_empty()).count(),
        elapsed_ms = elapsed.as_millis() as u64,
        "fetch complete"
    );

    Ok(SymbolFetch {
        contract: contract.clone(),
        series,
        windows: outcomes,
        elapsed,
    })
}

/// Issues a request under the policy's timeout, retrying retryable failures.
async fn request_with_retry<P>(
    provider: &P,
    request: &HistoricalRequest,
    window: &Window,
    policy: &RequestPolicy,
) -> Result<(Vec<Bar>, u32), FetchError>
where
    P: HistoricalProvider + ?Sized,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        // `None` marks a timeout.
        let failure: Option<ProviderError> =
            match tokio::time::timeout(policy.timeout, provider.request_bars(request)).await {
                Ok(Ok(bars)) => return Ok((bars, attempts)),
                Ok(Err(e)) if e.is_retryable() => Some(e),
                Ok(Err(source)) => {
                    return Err(FetchError::Provider {
                        window: *window,
                        source,
                    });
                }
                Err(_) => None,
            };

        if attempts > policy.max_retries {
            return Err(match failure {
                Some(source) => FetchError::Provider {
                    window: *window,
                    source,
                },
                None => FetchError::Timeout {
                    window: *window,
                    attempts,
                },
            });
        }

        let delay = policy.backoff_delay(attempts);
        match &failure {
            Some(e) => tracing::warn!(%window, attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e, "retrying window request"),
            None => tracing::warn!(%window, attempt = attempts, delay_ms = delay.as_millis() as u64, "window request timed out, retrying"),
        }
        tokio::time::sleep(delay).await;
    }
}

/// Bars surviving the window filter, with discard counts.
struct Filtered {
    bars: Vec<Bar>,
    outside: usize,
    rejected: usize,
}

/// Keeps bars with `chunk_start <= timestamp < chunk_end`, so a bar on the
/// boundary between adjacent windows belongs only to the newer one.
fn filter_window(bars: Vec<Bar>, window: &Window, validate: bool) -> Filtered {
    let mut outside = 0;
    let mut rejected = 0;

    let bars = bars
        .into_iter()
        .filter(|bar| {
            if !window.contains(bar.timestamp) {
                outside += 1;
                return false;
            }
            if validate && let Err(e) = bar.validate() {
                tracing::warn!(error = %e, "dropping invalid bar");
                rejected += 1;
                return false;
            }
            true
        })
        .collect();

    Filtered {
        bars,
        outside,
        rejected,
    }
}
