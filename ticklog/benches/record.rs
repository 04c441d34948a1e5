//! Microbenchmarks for the `record()` hot path.
//!
//! Measures per-record latency, amortized over implicit flushes.
//!
//! Run with: `cargo bench -p ticklog -- record`

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tempfile::tempdir;
use ticklog::analysis::summarize;
use ticklog::{DataLogger, LoggerConfig, Record, SharedLogger};

/// Creates a logger in a fresh temp directory.
fn setup_logger(config: LoggerConfig) -> (DataLogger, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let logger = DataLogger::with_config(temp_dir.path().join("bench.tkl"), config).unwrap();
    (logger, temp_dir)
}

fn bench_record_identity(c: &mut Criterion) {
    let (mut logger, _dir) = setup_logger(LoggerConfig::default());
    let mut ts = 1_700_000_000_000_000_000u64;

    c.bench_function("record/identity", |b| {
        b.iter(|| {
            ts += 1_000;
            logger
                .record(black_box(1), black_box(ts), black_box(42))
                .unwrap();
        });
    });

    logger.flush_and_destroy().unwrap();
}

fn bench_record_scaled(c: &mut Criterion) {
    let mut group = c.benchmark_group("record/when_scale");

    for scale in [2u64, 10, 1_000] {
        let (mut logger, _dir) = setup_logger(LoggerConfig::new(scale, scale));
        let mut ts = 1_700_000_000_000_000_000u64;

        group.bench_with_input(BenchmarkId::from_parameter(scale), &scale, |b, _| {
            b.iter(|| {
                ts += 1_337;
                logger
                    .record(black_box(1), black_box(ts), black_box(ts >> 8))
                    .unwrap();
            });
        });

        logger.flush_and_destroy().unwrap();
    }

    group.finish();
}

fn bench_record_now(c: &mut Criterion) {
    let (mut logger, _dir) = setup_logger(LoggerConfig::default());

    c.bench_function("record_now/wall_clock", |b| {
        b.iter(|| logger.record_now(black_box(7), black_box(99)).unwrap());
    });

    logger.flush_and_destroy().unwrap();
}

fn bench_shared_record(c: &mut Criterion) {
    let temp_dir = tempdir().unwrap();
    let logger = SharedLogger::create(temp_dir.path().join("shared.tkl"), 1, 1).unwrap();
    let mut ts = 0u64;

    c.bench_function("record/shared_uncontended", |b| {
        b.iter(|| {
            ts += 1;
            logger
                .record(black_box(1), black_box(ts), black_box(1))
                .unwrap();
        });
    });

    logger.flush_and_destroy().unwrap();
}

fn bench_summarize(c: &mut Criterion) {
    let records: Vec<Record> = (0..100_000u64)
        .map(|i| Record::new(1, i * 1_000, (i * 7_919) % 1_000_000))
        .collect();

    c.bench_function("summarize/100k", |b| {
        b.iter(|| summarize(black_box(records.iter().copied())));
    });
}

criterion_group!(
    benches,
    bench_record_identity,
    bench_record_scaled,
    bench_record_now,
    bench_shared_record,
    bench_summarize,
);
criterion_main!(benches);
