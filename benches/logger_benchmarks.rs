//! Criterion benchmarks for log_pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use log_pipeline::core::redactor::redact;
use log_pipeline::core::template;
use log_pipeline::info;
use log_pipeline::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn running_logger() -> Logger {
    Logger::builder()
        .without_console()
        .display_level(LogLevel::Trace)
        .poll_interval(Duration::from_millis(1))
        .start()
        .expect("start logger")
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(1));

    let args = [LogArg::from(42), LogArg::from("alice"), LogArg::from(3.5)];

    group.bench_function("literal", |b| {
        b.iter(|| template::render(black_box("Server started without arguments"), &[]));
    });

    group.bench_function("three_args", |b| {
        b.iter(|| {
            template::render(
                black_box("Request {} from {} took {} ms"),
                black_box(&args),
            )
        });
    });

    group.bench_function("missing_args", |b| {
        b.iter(|| template::render(black_box("{} {} {} {} {} {}"), black_box(&args)));
    });

    group.finish();
}

// ============================================================================
// Redaction Benchmarks
// ============================================================================

fn bench_redact(c: &mut Criterion) {
    let mut group = c.benchmark_group("redact");
    group.throughput(Throughput::Elements(1));

    let text = "user=alice password=Hunter2 token=SECRET123 session=abcdef";
    let small = ["secret"];
    let large: Vec<String> = (0..32).map(|i| format!("word{}", i)).collect();

    group.bench_function("no_match", |b| {
        b.iter(|| redact(black_box(text), black_box(&["nothing-here"])));
    });

    group.bench_function("one_entry", |b| {
        b.iter(|| redact(black_box(text), black_box(&small)));
    });

    group.bench_function("32_entries", |b| {
        b.iter(|| redact(black_box(text), black_box(&large)));
    });

    group.finish();
}

// ============================================================================
// Enqueue Benchmarks
// ============================================================================

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    group.throughput(Throughput::Elements(1));

    let logger = Arc::new(running_logger());

    group.bench_function("plain", |b| {
        b.iter(|| logger.info(black_box("Plain message")));
    });

    group.bench_function("with_args", |b| {
        b.iter(|| info!(logger, "User {} logged in from {}", black_box(42), "10.0.0.1"));
    });

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        logger.info(black_box("Concurrent message"));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
    logger.stop();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_render, bench_redact, bench_enqueue);

criterion_main!(benches);
