//! Opening-range breakout command.

use anyhow::{Context, Result, bail};
use barwalk_lib::prelude::*;
use barwalk_lib::{Breakout, FetchJob, OpeningRange, Session, fetch_all};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::OrbArgs;
use crate::display::{build_provider, format_bar, parse_tz, request_policy};

/// Opening range and breakout state for one symbol.
#[derive(Default)]
struct Tracker {
    range: Option<OpeningRange>,
    monitor: Option<BreakoutMonitor>,
    last_seen: Option<DateTime<Utc>>,
}

impl Tracker {
    /// Feeds the session's bars so far, returning newly detected breakouts.
    fn update(&mut self, bars: &[Bar], minutes: usize) -> Vec<Breakout> {
        // The range stays provisional until `minutes` bars exist.
        let complete = self.range.is_some_and(|r| r.bars >= minutes);
        if !complete {
            self.range = opening_range(bars, minutes);
            self.monitor = self
                .range
                .filter(|r| r.bars >= minutes)
                .map(BreakoutMonitor::new);
        }

        let Some(monitor) = self.monitor.as_mut() else {
            return Vec::new();
        };
        let last_seen = self.last_seen;
        let events =
            monitor.scan(bars.iter().filter(|b| last_seen.is_none_or(|t| b.timestamp > t)));
        self.last_seen = bars.last().map(|b| b.timestamp).or(self.last_seen);
        events
    }
}

/// Execute the orb command.
pub(crate) async fn orb(args: OrbArgs, quiet: bool) -> Result<()> {
    let tz = parse_tz(&args.source.tz)?;
    let calendar = WeekdayCalendar::new(SessionHours::nyse().with_timezone(tz));

    let date = match &args.date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("Invalid date: {text}"))?,
        None => Utc::now().with_timezone(&tz).date_naive(),
    };
    if args.minutes == 0 {
        bail!("Opening range must span at least one minute");
    }
    let session = calendar
        .is_trading_day(date)
        .then(|| calendar.hours().session_on(date))
        .flatten()
        .with_context(|| format!("{date} is not a trading day"))?;

    let provider = build_provider(&args.source).await?;
    let options = FetchOptions {
        regular_hours_only: !args.source.outside_rth,
        policy: request_policy(&args.source),
        ..FetchOptions::default()
    };
    let contracts: Vec<Contract> = args.symbols.iter().map(Contract::stock).collect();
    let mut trackers: HashMap<Contract, Tracker> = HashMap::new();

    loop {
        let upto = Utc::now().min(session.close);
        if upto <= session.open {
            if !args.watch {
                bail!("Session on {date} has not opened yet");
            }
        } else {
            let series = fetch_session(
                provider.as_ref(),
                &contracts,
                session,
                upto,
                &options,
                args.concurrency,
            )
            .await;
            for (contract, bars) in series {
                let tracker = trackers.entry(contract.clone()).or_default();
                let had_range = tracker.monitor.is_some();
                let events = tracker.update(&bars, args.minutes);

                if !had_range || !args.watch {
                    report_range(&contract, tracker.range.as_ref(), args.minutes, quiet);
                }
                for event in events {
                    println!(
                        "{contract}: {} breakout at {} close {:.2} vs {:.2}",
                        event.direction,
                        event.timestamp.with_timezone(&tz).format("%H:%M"),
                        event.close,
                        event.level
                    );
                    if let Some(bar) = bars.iter().find(|b| b.timestamp == event.timestamp) {
                        tracing::debug!(bar = %format_bar(bar, tz), "breakout bar");
                    }
                }
            }
        }

        if !args.watch || Utc::now() >= session.close {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            () = tokio::time::sleep(Duration::from_secs(args.poll_secs.max(1))) => {}
        }
    }

    Ok(())
}

/// Fetches the session up to `upto` for every contract. Failed symbols are
/// logged and left out.
async fn fetch_session(
    provider: &dyn HistoricalProvider,
    contracts: &[Contract],
    session: Session,
    upto: DateTime<Utc>,
    options: &FetchOptions,
    concurrency: usize,
) -> Vec<(Contract, Vec<Bar>)> {
    // The partial session fits one request.
    let Some(window) = Window::new(session.open, upto, WindowSize::Days(1)) else {
        return Vec::new();
    };
    let jobs = contracts
        .iter()
        .map(|c| FetchJob::new(c.clone(), vec![window]))
        .collect();

    fetch_all(provider, jobs, options, concurrency, &())
        .await
        .into_iter()
        .filter_map(|(contract, result)| match result {
            Ok(fetch) => Some((contract, fetch.series.into_bars())),
            Err(e) => {
                eprintln!("{contract}: {e}");
                None
            }
        })
        .collect()
}

fn report_range(contract: &Contract, range: Option<&OpeningRange>, minutes: usize, quiet: bool) {
    if quiet {
        return;
    }
    match range {
        Some(range) if range.bars >= minutes => {
            println!("{contract}: opening range {range}");
        }
        Some(range) => {
            println!("{contract}: opening range so far {range} ({} of {minutes} bars)", range.bars);
        }
        None => println!("{contract}: no bars yet"),
    }
}
