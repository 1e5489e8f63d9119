//! Planning and fetch-and-stitch benchmarks against the synthetic provider.
//!
//! Run with: `cargo bench --package barwalk-bench`

use barwalk_bench::{bench_options, range_ending_friday};
use barwalk_lib::{
    Contract, FetchJob, SyntheticProvider, WeekdayCalendar, WindowPlanner, WindowSize, execute,
    fetch_all,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn plan_benchmark(c: &mut Criterion) {
    let planner = WindowPlanner::new(WeekdayCalendar::default());
    let mut group = c.benchmark_group("plan");

    for days in [30, 365, 3650] {
        let range = range_ending_friday(days);
        group.throughput(Throughput::Elements(days as u64));

        group.bench_with_input(BenchmarkId::new("calendar", days), &range, |b, range| {
            b.iter(|| planner.plan(black_box(*range), WindowSize::Days(1)));
        });
        group.bench_with_input(BenchmarkId::new("sessions", days), &range, |b, range| {
            b.iter(|| planner.plan(black_box(*range), WindowSize::Sessions(5)));
        });
    }

    group.finish();
}

fn stitch_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let planner = WindowPlanner::new(WeekdayCalendar::default());
    let provider = SyntheticProvider::new();
    let options = bench_options();
    let contract = Contract::stock("AAPL");

    let mut group = c.benchmark_group("stitch");
    group.sample_size(20);

    for days in [5, 30, 90] {
        let windows = planner
            .plan(range_ending_friday(days), WindowSize::Days(1))
            .expect("positive window size");
        group.throughput(Throughput::Elements(windows.len() as u64));

        group.bench_with_input(BenchmarkId::new("execute", days), &windows, |b, windows| {
            b.to_async(&runtime)
                .iter(|| execute(&contract, windows, &provider, &options));
        });
    }

    let windows = planner
        .plan(range_ending_friday(30), WindowSize::Days(1))
        .expect("positive window size");
    group.bench_function("fetch_all/8-symbols", |b| {
        b.to_async(&runtime).iter(|| {
            let jobs = ["AAPL", "MSFT", "SPY", "QQQ", "NVDA", "AMZN", "META", "TSLA"]
                .into_iter()
                .map(|s| FetchJob::new(Contract::stock(s), windows.clone()))
                .collect();
            fetch_all(&provider, jobs, &options, 4, &())
        });
    });

    group.finish();
}

criterion_group!(benches, plan_benchmark, stitch_benchmark);
criterion_main!(benches);
