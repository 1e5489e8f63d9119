//! Bounded concurrent fetching across symbols.

use barwalk_types::{Contract, Window};
use futures::stream::{self, StreamExt};

use crate::{FetchError, FetchOptions, FetchProgress, HistoricalProvider, SymbolFetch};
use crate::executor::execute_with_progress;

/// One symbol's planned fetch.
#[derive(Debug, Clone)]
pub struct FetchJob {
    /// Contract to fetch.
    pub contract: Contract,
    /// Windows in newest-first order.
    pub windows: Vec<Window>,
}

impl FetchJob {
    /// Creates a job.
    #[must_use]
    pub const fn new(contract: Contract, windows: Vec<Window>) -> Self {
        Self { contract, windows }
    }
}

/// Fetches every job with at most `concurrency` symbols in flight.
///
/// Each symbol's windows stay sequential; only distinct symbols run
/// concurrently. A failure aborts that symbol alone and is returned in its
/// slot. Results come back in completion order.
pub async fn fetch_all<P>(
    provider: &P,
    jobs: Vec<FetchJob>,
    options: &FetchOptions,
    concurrency: usize,
    progress: &(impl FetchProgress + ?Sized),
) -> Vec<(Contract, Result<SymbolFetch, FetchError>)>
where
    P: HistoricalProvider + ?Sized,
{
    let concurrency = concurrency.max(1);
    tracing::info!(symbols = jobs.len(), concurrency, "starting fetch");

    stream::iter(jobs)
        .map(|job| async move {
            let result =
                execute_with_progress(&job.contract, &job.windows, provider, options, progress)
                    .await;
            if let Err(e) = &result {
                tracing::error!(symbol = %job.contract, error = %e, "symbol fetch failed");
            }
            (job.contract, result)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}
