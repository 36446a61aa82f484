//! Benchmarks for point ledger filtering and aggregation
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use kuriftu::loyalty::ledger::{sort_newest_first, to_csv};
use kuriftu::loyalty::{
    DateWindow, LedgerFilter, LedgerSummary, PointTransaction, TransactionType, TypeFilter,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn create_history(count: usize) -> Vec<PointTransaction> {
    (0..count)
        .map(|i| {
            let date = today() - Duration::days((i % 400) as i64);
            let id = format!("tx-{}", i);
            if i % 3 == 0 {
                PointTransaction::redeem(id, date, "Spa Treatment Redemption", 1_200)
            } else {
                PointTransaction::earn(id, date, "Stay at Kuriftu Resort Bishoftu", 2_500)
            }
        })
        .collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    for size in [100, 1000, 10000] {
        let history = create_history(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("summarize_{}", size), |b| {
            b.iter(|| LedgerSummary::from_transactions(black_box(&history)))
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let history = create_history(10_000);
    group.throughput(Throughput::Elements(history.len() as u64));

    group.bench_function("all", |b| {
        let filter = LedgerFilter::all(today());
        b.iter(|| filter.apply(black_box(&history)))
    });

    group.bench_function("search_type_window", |b| {
        let filter = LedgerFilter::all(today())
            .search("spa")
            .kind(TypeFilter::Only(TransactionType::Redeem))
            .window(DateWindow::Last90Days);
        b.iter(|| filter.apply(black_box(&history)))
    });

    group.finish();
}

fn bench_sort_and_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let history = create_history(1_000);

    group.bench_function("sort_newest_first_1000", |b| {
        b.iter(|| {
            let mut copy = history.clone();
            sort_newest_first(black_box(&mut copy));
            copy
        })
    });

    group.bench_function("csv_1000", |b| {
        b.iter(|| to_csv(black_box(&history)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_summary, bench_filter, bench_sort_and_export);
criterion_main!(benches);
