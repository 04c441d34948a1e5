//! Example: time a workload, then summarize the log.
//!
//! This example shows how to:
//! - Run independent loggers on worker threads
//! - Time sections with `start`/`finish`
//! - Read the log back and print a summary, CDF and timeseries
//!
//! Run with: `RUST_LOG=ticklog=debug cargo run -p ticklog --example latency_summary`

use std::thread;
use std::time::Duration;

use ticklog::analysis::{cdf, summarize, timeseries};
use ticklog::units::{autoscale, bucket_nanos};
use ticklog::{ClockSource, DataLogger, DataReader, LoggerConfig, SeriesFilter};

const SERIES_WORK: u32 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir().join("ticklog-example");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("latency.tkl");

    let config = LoggerConfig::new(1, 1)
        .buffer_capacity(Some(1_024))
        .clock(ClockSource::Monotonic);

    let workers: Vec<_> = (0..4u32)
        .map(|w| {
            let path = dir.join(format!("worker_{w}.tkl"));
            let config = config.clone();
            thread::spawn(move || -> ticklog::Result<()> {
                let mut logger = DataLogger::with_config(&path, config)?;
                for i in 0..200u64 {
                    let span = logger.start(SERIES_WORK);
                    thread::sleep(Duration::from_micros(50 + (i % 7) * 30));
                    logger.finish(span)?;
                }
                logger.flush_and_destroy()
            })
        })
        .collect();

    // The main thread logs into its own file.
    let mut logger = DataLogger::with_config(&path, config)?;
    for i in 0..500u64 {
        let span = logger.start(SERIES_WORK);
        thread::sleep(Duration::from_micros(20 + (i % 11) * 15));
        logger.finish(span)?;
    }
    #[cfg(unix)]
    logger.record_rusage(ticklog::clock::wallclock_ns())?;
    logger.flush_and_destroy()?;

    for worker in workers {
        worker.join().map_err(|_| "worker thread panicked")??;
    }

    let reader = DataReader::open(&path)?;
    let summary = summarize(reader.iter(SeriesFilter::Only(SERIES_WORK)));
    let unit = autoscale(summary.mean);
    #[allow(clippy::cast_precision_loss)]
    let scale = unit.nanos() as f64;

    println!("📊 {}", path.display());
    println!(
        "n={} throughput={:.1}/s mean={:.2}{unit} stdev={:.2}{unit}",
        summary.points,
        summary.throughput(),
        summary.mean / scale,
        summary.stdev / scale,
    );

    println!("\nCDF (100us buckets):");
    for point in cdf(reader.iter(SeriesFilter::User), bucket_nanos("100us")?)? {
        println!("  <= {:>6}us  {:5.1}%", point.x / 1_000, point.y);
    }

    println!("\nSamples per 5ms:");
    for point in timeseries(reader.iter(SeriesFilter::User), bucket_nanos("5ms")?)? {
        println!("  +{:>4}ms  {}", point.x / 1_000_000, point.y);
    }

    Ok(())
}
