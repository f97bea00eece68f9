//! Benchmarks for the pull merge
//!
//! Run with: cargo bench --package ledgersync-sync-engine

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ledgersync_core::{sample_transactions, Transaction};
use ledgersync_sync_engine::merge;
use std::hint::black_box;

fn overlapping(local: &[Transaction], fresh: usize) -> Vec<Transaction> {
    // Half the batch echoes local records, the rest is new
    let mut remote: Vec<Transaction> = local.iter().step_by(2).cloned().collect();
    remote.extend(sample_transactions(fresh));
    remote
}

fn bench_merge_new_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_new_records");

    for size in [100usize, 1_000, 10_000] {
        let local = sample_transactions(size);
        let remote = sample_transactions(size / 10);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(merge(black_box(&local), remote.clone())));
        });
    }

    group.finish();
}

fn bench_merge_with_duplicates(c: &mut Criterion) {
    let local = sample_transactions(1_000);
    let remote = overlapping(&local, 100);

    c.bench_function("merge_with_duplicates", |b| {
        b.iter(|| black_box(merge(black_box(&local), remote.clone())));
    });
}

fn bench_merge_idempotent_replay(c: &mut Criterion) {
    let local = sample_transactions(1_000);
    let remote = sample_transactions(200);
    let merged = merge(&local, remote.clone());

    c.bench_function("merge_replay", |b| {
        b.iter(|| black_box(merge(black_box(&merged), remote.clone())));
    });
}

criterion_group!(
    benches,
    bench_merge_new_records,
    bench_merge_with_duplicates,
    bench_merge_idempotent_replay
);
criterion_main!(benches);
