//! Benchmarks for empirica-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use empirica_math::{
    StandardError, assign_buckets, breakpoints, equal_percentiles, least_squares, winsorize,
};
use ndarray::{Array1, Array2};
use rand::Rng;

fn random_array(n: usize) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05))
}

fn random_design(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |(_, j)| if j == 0 { 1.0 } else { rng.r#gen::<f64>() })
}

fn bench_breakpoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("breakpoints");
    let pcts = equal_percentiles(10);

    for size in [100, 1000, 10000, 100000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_array(size).to_vec();
            b.iter(|| {
                let bps = breakpoints(black_box(&data), black_box(&pcts)).unwrap();
                assign_buckets(black_box(&data), &bps)
            });
        });
    }

    group.finish();
}

fn bench_winsorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("winsorize");

    for size in [100, 1000, 10000, 100000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_array(size);
            b.iter(|| winsorize(black_box(&data), black_box(0.01)).unwrap());
        });
    }

    group.finish();
}

fn bench_least_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("least_squares");

    for n_assets in [100, 1000, 5000] {
        group.throughput(Throughput::Elements(n_assets as u64));
        group.bench_with_input(BenchmarkId::new("n_assets", n_assets), &n_assets, |b, &n| {
            let y = random_array(n);
            let x = random_design(n, 6);
            b.iter(|| least_squares(black_box(&y), black_box(&x), None).unwrap());
        });
    }

    group.finish();
}

fn bench_newey_west(c: &mut Criterion) {
    let mut group = c.benchmark_group("newey_west");

    for n_periods in [120, 600, 1200] {
        group.bench_with_input(BenchmarkId::from_parameter(n_periods), &n_periods, |b, &n| {
            let series = random_array(n).to_vec();
            b.iter(|| StandardError::default().estimate(black_box(&series)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_breakpoints, bench_winsorize, bench_least_squares, bench_newey_west);
criterion_main!(benches);
