#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmarks for map, pie and matrix rendering.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cheshire_render::prelude::*;

/// Deterministic scatter around two centers.
fn sample_points(n: usize) -> Vec<GeoPoint> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            let (lat, lon) = if i % 4 == 0 { (51.5, -0.12) } else { (40.7, -74.0) };
            GeoPoint::new(lat + (t * 0.37).sin() * 0.05, lon + (t * 0.73).cos() * 0.08).with_value((i % 7) as f64 + 1.0)
        })
        .collect()
}

fn map_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("map");
    let options = MapOptions::new().size(124, 26);

    for n in [100, 1_000, 10_000] {
        let points = sample_points(n);
        group.bench_with_input(BenchmarkId::new("points", n), &points, |b, points| {
            b.iter(|| render_map(black_box(points), MapMode::Points, &options));
        });
    }

    let points = sample_points(1_000);
    for mode in MapMode::ALL {
        group.bench_with_input(BenchmarkId::new("mode", mode), &mode, |b, &mode| {
            b.iter(|| render_map(black_box(&points), mode, &options));
        });
    }

    group.finish();
}

fn pie_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pie");

    for slices in [2, 6, 12] {
        let values: Vec<f64> = (1..=slices).map(f64::from).collect();
        let labels: Vec<String> = (1..=slices).map(|i| format!("slice {i}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(slices), &slices, |b, _| {
            b.iter(|| render_pie(black_box(&values), &labels, &PieOptions::new().radius(10.0)));
        });
    }

    group.finish();
}

fn matrix_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");

    for keys in [5, 20, 50] {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut values = Vec::new();
        for i in 0..keys {
            for j in 0..keys {
                x.push(AxisKey::from(format!("c{i:02}")));
                y.push(AxisKey::from(format!("r{j:02}")));
                values.push(((i * j) % 13) as f64);
            }
        }
        group.bench_with_input(BenchmarkId::from_parameter(format!("{keys}x{keys}")), &keys, |b, _| {
            b.iter(|| render_matrix(black_box(&x), &y, &values, &MatrixOptions::new().show_values(true)));
        });
    }

    group.finish();
}

criterion_group!(benches, map_benchmark, pie_benchmark, matrix_benchmark);
criterion_main!(benches);
