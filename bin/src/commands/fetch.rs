//! Fetch command.
//!
//! Plans request windows for every symbol, fetches them with bounded
//! concurrency and writes one file per symbol.

use anyhow::{Context, Result, anyhow, bail};
use barwalk_lib::prelude::*;
use barwalk_lib::{FetchJob, fetch_all};
use chrono::Utc;
use indicatif::MultiProgress;
use std::collections::HashMap;
use std::time::Instant;

use crate::FetchArgs;
use crate::display::{
    WindowProgress, build_provider, parse_tz, print_empty_windows, print_preview, request_policy,
    window_bar, write_bars,
};

/// Execute the fetch command.
pub(crate) async fn fetch(args: FetchArgs, quiet: bool) -> Result<()> {
    let tz = parse_tz(&args.source.tz)?;
    let hours = SessionHours::nyse().with_timezone(tz);
    let calendar = WeekdayCalendar::new(hours);

    // 1. Resolve the range and window size before touching the provider
    let start = parse_local_datetime(&args.start, &tz)
        .with_context(|| format!("Invalid start: {}", args.start))?;
    let end = match &args.end {
        Some(text) => {
            parse_local_datetime(text, &tz).with_context(|| format!("Invalid end: {text}"))?
        }
        None => Utc::now(),
    };
    let range = TimeRange::new(start, end)?;
    let size = match args.window_sessions {
        Some(n) => WindowSize::sessions(n)?,
        None => WindowSize::days(args.window_days)?,
    };

    let planner = WindowPlanner::new(calendar);
    let windows = planner.plan(range, size)?;
    if windows.is_empty() {
        bail!("No trading sessions between {} and {}", args.start, end.with_timezone(&tz));
    }
    tracing::info!(windows = windows.len(), %size, "planned request windows");

    let mut symbols: Vec<Contract> = Vec::with_capacity(args.symbols.len());
    for contract in args.symbols.iter().map(Contract::stock) {
        if !symbols.contains(&contract) {
            symbols.push(contract);
        }
    }

    // 2. Build provider and per-symbol progress
    let provider = build_provider(&args.source).await?;
    let options = FetchOptions {
        bar_size: args.bar_size,
        data_kind: args.what.into(),
        regular_hours_only: !args.source.outside_rth,
        validate_bars: !args.no_validate,
        policy: request_policy(&args.source),
    };

    let multi_progress = MultiProgress::new();
    let progress = WindowProgress::new(
        symbols
            .iter()
            .map(|c| {
                let pb = multi_progress.add(window_bar(c.symbol(), windows.len(), quiet));
                (c.symbol().to_string(), pb)
            })
            .collect::<HashMap<_, _>>(),
    );

    let jobs = symbols
        .into_iter()
        .map(|contract| FetchJob::new(contract, windows.clone()))
        .collect();

    // 3. Fetch all symbols
    let started = Instant::now();
    let results = fetch_all(provider.as_ref(), jobs, &options, args.concurrency, &progress).await;
    let fetch_time = started.elapsed();

    // 4. Write outputs
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let stamp = |t: chrono::DateTime<Utc>| t.with_timezone(&tz).format("%Y%m%d").to_string();
    let mut failures = Vec::new();
    let total = results.len();

    for (contract, result) in results {
        let symbol = contract.symbol();
        let fetch = match result {
            Ok(fetch) => fetch,
            Err(e) => {
                if let Some(pb) = progress.get(symbol) {
                    pb.abandon_with_message("failed");
                }
                failures.push(anyhow!("{symbol}: {e}"));
                continue;
            }
        };
        if let Some(pb) = progress.get(symbol) {
            pb.finish_with_message(format!("{} bars", fetch.series.len()));
        }

        let bars = match args.resample {
            Some(size) if size != args.bar_size => resample(fetch.series.bars(), size, tz),
            _ => fetch.series.bars().to_vec(),
        };

        let output_path = args.output_dir.join(format!(
            "{symbol}_{}_{}.{}",
            stamp(range.start()),
            stamp(range.end()),
            args.format.extension()
        ));
        if let Err(e) = write_bars(&bars, &output_path, args.format, tz) {
            failures.push(e.context(format!("{symbol}: write failed")));
            continue;
        }

        if !quiet {
            print_preview(symbol, &bars, fetch.elapsed, args.preview, tz);
            print_empty_windows(&fetch, tz);
            if fetch.rejected_bars() > 0 {
                println!("  dropped {} invalid bars", fetch.rejected_bars());
            }
            println!("  Written: {}", output_path.display());
        }
    }

    if !quiet {
        println!("\nFetched {total} symbols in {:.2}s", fetch_time.as_secs_f64());
    }

    // 5. Report failures
    if !failures.is_empty() {
        if !quiet {
            println!("\nFailed:");
            for failure in &failures {
                println!("  {failure:#}");
            }
        }
        bail!("{} out of {} symbols failed", failures.len(), total);
    }

    Ok(())
}
