//! Display utilities and output formatting for the barwalk CLI.

use anyhow::{Context, Result, anyhow};
#[cfg(not(feature = "parquet"))]
use anyhow::bail;
use barwalk_lib::prelude::*;
use barwalk_lib::{FetchProgress, GatewayConfig, SymbolFetch, WindowOutcome};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use crate::{ProviderKind, SourceArgs};

/// Output format for downloaded data.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write bars to a file in the specified format.
pub(crate) fn write_bars(bars: &[Bar], output: &Path, format: Format, tz: Tz) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let writer = BufWriter::new(file);

    match format {
        Format::Csv => CsvFormatter::new().with_timezone(tz).write_bars(bars, writer)?,
        Format::Json => JsonFormatter::new().write_bars(bars, writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_bars(bars, writer)?,
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                ParquetFormatter::new().write_bars(bars, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                drop(writer);
                bail!("Parquet support not compiled in");
            }
        }
    }

    Ok(())
}

/// Parse an IANA timezone name.
pub(crate) fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Invalid timezone {name}: {e}"))
}

/// A bar rendered in exchange time.
pub(crate) fn format_bar(bar: &Bar, tz: Tz) -> String {
    format!(
        "{}  O={:.2} H={:.2} L={:.2} C={:.2} V={}",
        bar.timestamp.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S%:z"),
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume
    )
}

/// Summary line for one symbol's fetch.
pub(crate) fn preview_header(symbol: &str, bars: usize, elapsed: Duration) -> String {
    format!("{symbol}: {bars} bars in {:.2}s", elapsed.as_secs_f64())
}

/// Print the first and last `n` bars of a series.
pub(crate) fn print_preview(symbol: &str, bars: &[Bar], elapsed: Duration, n: usize, tz: Tz) {
    println!("{}", preview_header(symbol, bars.len(), elapsed));
    if n == 0 || bars.is_empty() {
        return;
    }

    if bars.len() <= n * 2 {
        for bar in bars {
            println!("  {}", format_bar(bar, tz));
        }
        return;
    }

    for bar in &bars[..n] {
        println!("  {}", format_bar(bar, tz));
    }
    println!("  ...");
    for bar in &bars[bars.len() - n..] {
        println!("  {}", format_bar(bar, tz));
    }
}

/// Print windows that returned no bars.
pub(crate) fn print_empty_windows(fetch: &SymbolFetch, tz: Tz) {
    for outcome in fetch.empty_windows() {
        println!(
            "  no data for {} .. {}",
            outcome.window.chunk_start().with_timezone(&tz).format("%Y-%m-%d %H:%M"),
            outcome.window.chunk_end().with_timezone(&tz).format("%Y-%m-%d %H:%M"),
        );
    }
}

/// Build the request policy from command-line settings.
pub(crate) fn request_policy(source: &SourceArgs) -> RequestPolicy {
    RequestPolicy {
        timeout: Duration::from_secs(source.timeout),
        max_retries: source.retries,
        ..RequestPolicy::default()
    }
}

/// Build the configured provider. Gateway sessions are checked before use.
pub(crate) async fn build_provider(source: &SourceArgs) -> Result<Box<dyn HistoricalProvider>> {
    match source.provider {
        ProviderKind::Synthetic => Ok(Box::new(SyntheticProvider::new())),
        ProviderKind::Gateway => {
            let config = GatewayConfig {
                base_url: source.gateway.clone(),
                timeout: Duration::from_secs(source.timeout),
                accept_invalid_certs: source.insecure,
                ..GatewayConfig::default()
            };
            let provider = GatewayProvider::new(config).context("Failed to create HTTP client")?;
            provider.check_session().await.with_context(|| {
                format!(
                    "Gateway at {} is not ready; log in through its web page first",
                    source.gateway
                )
            })?;
            Ok(Box::new(provider))
        }
    }
}

/// Per-symbol progress bars fed by window completions.
pub(crate) struct WindowProgress {
    bars: HashMap<String, ProgressBar>,
}

impl WindowProgress {
    pub(crate) fn new(bars: HashMap<String, ProgressBar>) -> Self {
        Self { bars }
    }

    pub(crate) fn get(&self, symbol: &str) -> Option<&ProgressBar> {
        self.bars.get(symbol)
    }
}

impl FetchProgress for WindowProgress {
    fn window_done(&self, contract: &Contract, outcome: &WindowOutcome) {
        if let Some(pb) = self.bars.get(contract.symbol()) {
            pb.inc(1);
            if outcome.is_empty() {
                pb.set_message("empty window");
            } else {
                pb.set_message(format!("+{} bars", outcome.kept));
            }
        }
    }
}

/// Progress bar for a symbol's windows.
pub(crate) fn window_bar(symbol: &str, windows: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(windows as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} windows {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_prefix(format!("{symbol:>8}"));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_header_shows_fetch_time() {
        assert_eq!(
            preview_header("AAPL", 780, Duration::from_millis(1534)),
            "AAPL: 780 bars in 1.53s"
        );
        assert_eq!(preview_header("SPY", 0, Duration::ZERO), "SPY: 0 bars in 0.00s");
    }
}
