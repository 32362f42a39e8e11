//! Criterion benchmarks for fanlog

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fanlog::prelude::*;
use std::io;
use std::sync::Arc;
use std::thread;

fn sink_options() -> LoggerOptions {
    LoggerOptions::new().with_output(Output::new(io::sink()))
}

// ============================================================================
// Hot Path Benchmarks
// ============================================================================

fn bench_single_destination(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_destination");
    group.throughput(Throughput::Elements(1));

    let text = DestinationLogger::new(&sink_options());
    let json = DestinationLogger::new(&sink_options().with_json_format(true));

    group.bench_function("text", |b| {
        b.iter(|| text.info(black_box("request done"), args!["status", 200, "path", "/v1"]));
    });

    group.bench_function("json", |b| {
        b.iter(|| json.info(black_box("request done"), args!["status", 200, "path", "/v1"]));
    });

    group.bench_function("below_threshold", |b| {
        b.iter(|| text.debug(black_box("skipped"), args!["status", 200]));
    });

    let excluded = DestinationLogger::new(
        &sink_options().with_exclude(ExcludeByPrefix::new("health: ")),
    );
    group.bench_function("excluded", |b| {
        b.iter(|| excluded.error(black_box("health: ok"), &[]));
    });

    group.finish();
}

fn bench_implied_args(c: &mut Criterion) {
    let mut group = c.benchmark_group("implied_args");
    group.throughput(Throughput::Elements(1));

    let base = DestinationLogger::new(&sink_options());
    for depth in [1usize, 4, 16] {
        let mut logger: Arc<dyn Logger> = Arc::new(base.clone());
        for i in 0..depth {
            logger = logger.with(args![format!("k{}", i), i]);
        }
        group.bench_with_input(BenchmarkId::from_parameter(depth), &logger, |b, logger| {
            b.iter(|| logger.info(black_box("event"), args!["k0", "shadow"]));
        });
    }

    group.finish();
}

// ============================================================================
// Fan-Out Benchmarks
// ============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");
    group.throughput(Throughput::Elements(1));

    for members in [1usize, 3, 8] {
        let options: Vec<LoggerOptions> = (0..members).map(|_| sink_options()).collect();
        let logger = FanoutLogger::new(&options).expect("fan-out");
        group.bench_with_input(BenchmarkId::from_parameter(members), &logger, |b, logger| {
            b.iter(|| logger.info(black_box("event"), args!["member_count", members]));
        });
    }

    group.finish();
}

// ============================================================================
// Sink Benchmarks
// ============================================================================

struct DropSink;

impl SinkAdapter for DropSink {
    fn accept(&self, _name: &str, level: Level, msg: &str, args: &[FieldValue]) {
        black_box((level, msg, args));
    }
}

fn bench_intercept(c: &mut Criterion) {
    let mut group = c.benchmark_group("intercept");
    group.throughput(Throughput::Elements(1));

    for sinks in [0usize, 1, 4] {
        let logger = InterceptingLogger::new(&sink_options());
        for _ in 0..sinks {
            logger.register_sink(Arc::new(DropSink)).expect("register");
        }
        group.bench_with_input(BenchmarkId::from_parameter(sinks), &logger, |b, logger| {
            b.iter(|| logger.warn(black_box("event"), args!["k", "v"]));
        });
    }

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let logger = Arc::new(DestinationLogger::new(&sink_options()));
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let logger = Arc::clone(&logger);
                        thread::spawn(move || {
                            for i in 0..100 {
                                logger.info("event", args!["thread", t, "i", i]);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_destination,
    bench_implied_args,
    bench_fanout,
    bench_intercept,
    bench_concurrent_logging,
);

criterion_main!(benches);
