//! Benchmarks for the sweep pipeline hot paths
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sweepvis_rs::analysis::TdrAnalyzer;
use sweepvis_rs::pipeline::marker::nearest_index;
use sweepvis_rs::pipeline::{metrics, MarkerEngine};
use sweepvis_rs::{SweepPoint, SweepResult};

fn make_sweep(points: usize) -> SweepResult {
    let start = 1_000_000u64;
    let stop = 900_000_000u64;
    let steps = (points - 1) as u64;
    (0..points as u64)
        .map(|i| {
            let freq = start + (stop - start) * i / steps;
            let mag = 0.05 + 0.4 * ((i as f64 / 40.0).sin().abs());
            SweepPoint::new(freq, mag, 0.1)
        })
        .collect()
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");

    for size in [101usize, 1001, 10_001].iter() {
        let sweep = make_sweep(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("min_vswr", size), &sweep, |b, sweep| {
            b.iter(|| metrics::min_vswr(black_box(sweep)))
        });
        group.bench_with_input(BenchmarkId::new("max_gain", size), &sweep, |b, sweep| {
            b.iter(|| metrics::max_gain(black_box(sweep)))
        });
    }
    group.finish();
}

fn bench_marker_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("marker_resolution");

    for size in [101usize, 1001, 10_001].iter() {
        let sweep = make_sweep(*size);
        group.bench_with_input(
            BenchmarkId::new("nearest_index", size),
            &sweep,
            |b, sweep| b.iter(|| nearest_index(black_box(sweep), black_box(450_000_000))),
        );

        let mut engine = MarkerEngine::new();
        for i in 0..3u64 {
            engine.add(format!("Marker {}", i + 1), 100_000_000 * (i + 2));
        }
        group.bench_with_input(BenchmarkId::new("resolve_all", size), &sweep, |b, sweep| {
            let empty = SweepResult::new();
            b.iter(|| engine.resolve_all(black_box(sweep), black_box(&empty)))
        });
    }
    group.finish();
}

fn bench_tdr(c: &mut Criterion) {
    let mut group = c.benchmark_group("tdr");
    group.sample_size(20);

    for size in [101usize, 1001].iter() {
        let sweep = make_sweep(*size);
        let mut analyzer = TdrAnalyzer::new(0.66);
        group.bench_with_input(BenchmarkId::new("compute", size), &sweep, |b, sweep| {
            b.iter(|| analyzer.compute(black_box(sweep)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_metrics, bench_marker_resolution, bench_tdr);
criterion_main!(benches);
