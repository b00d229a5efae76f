//! Benchmarks for contour-skin operations.
//!
//! Run with: cargo bench -p contour-skin
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p contour-skin -- --save-baseline main
//! 2. After changes: cargo bench -p contour-skin -- --baseline main

use std::f64::consts::TAU;

use contour_skin::{
    AlignParams, Perimeter, ReconstructParams, TracedContour, align_with_params, link_chain,
    make_mesh_with_params, make_meshes, resample,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

// =============================================================================
// Test Contour Generation
// =============================================================================

/// Slightly wobbly ring, the way a hand-traced cross-section looks.
fn traced_points(n: usize, radius: f64, phase: f64) -> Vec<(f64, f64)> {
    (0..n)
        .map(|k| {
            let t = TAU * k as f64 / n as f64;
            let r = radius * (1.0 + 0.05 * (5.0 * t + phase).sin());
            (r * t.cos(), r * t.sin())
        })
        .collect()
}

fn perimeter(n: usize, radius: f64, phase: f64, z: f64) -> Perimeter {
    let (xs, ys): (Vec<f64>, Vec<f64>) = traced_points(n, radius, phase).into_iter().unzip();
    Perimeter::new(&xs, &ys, z, true).unwrap()
}

/// A linked stack of `layers` contours.
fn stack(layers: usize, n: usize) -> Vec<TracedContour> {
    let mut contours: Vec<TracedContour> = (0..layers)
        .map(|k| {
            let radius = 10.0 + (k as f64 * 0.7).sin();
            TracedContour::from_xy(k as u64, &traced_points(n, radius, k as f64), k as f64)
        })
        .collect();
    link_chain(&mut contours);
    contours
}

// =============================================================================
// Resampling Benchmarks
// =============================================================================

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resample");

    for n in [100, 1_000, 10_000] {
        let source = perimeter(n, 50.0, 0.0, 0.0);
        let delta = source.average_spacing();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("uniform", n), &source, |b, source| {
            b.iter(|| {
                let mut p = source.clone();
                resample(&mut p, black_box(delta)).unwrap();
                p
            })
        });
    }

    group.finish();
}

// =============================================================================
// Alignment Benchmarks
// =============================================================================

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("Align");
    group.sample_size(20); // quadratic per rotation, reduce samples

    for n in [50, 100, 200] {
        let mut p1 = perimeter(n, 10.0, 0.0, 0.0);
        let mut p2 = perimeter(n + n / 10, 10.5, 1.0, 1.0);
        p2.reorder(n / 3);
        let delta = p1.average_spacing();
        resample(&mut p1, delta).unwrap();
        resample(&mut p2, delta).unwrap();

        group.throughput(Throughput::Elements((p1.len() * p2.len()) as u64));

        group.bench_with_input(
            BenchmarkId::new("coarse_to_fine", n),
            &(&p1, &p2),
            |b, (p1, p2)| {
                let params = AlignParams::default();
                b.iter(|| align_with_params(black_box(p1), black_box(p2), delta, &params))
            },
        );

        // Only the small sizes; every rotation is one full matrix.
        if n <= 100 {
            group.bench_with_input(
                BenchmarkId::new("exhaustive", n),
                &(&p1, &p2),
                |b, (p1, p2)| {
                    let params = AlignParams::exhaustive();
                    b.iter(|| align_with_params(black_box(p1), black_box(p2), delta, &params))
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Reconstruction Benchmarks
// =============================================================================

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reconstruct");
    group.sample_size(10);

    for layers in [4, 16] {
        let contours = stack(layers, 120);
        let params = ReconstructParams::fixed_spacing(0.6);
        group.throughput(Throughput::Elements(layers as u64));

        group.bench_with_input(
            BenchmarkId::new("make_mesh", layers),
            &contours,
            |b, contours| b.iter(|| make_mesh_with_params(black_box(contours), &params)),
        );
    }

    let groups: Vec<Vec<TracedContour>> = (0..8).map(|_| stack(6, 120)).collect();
    group.throughput(Throughput::Elements(groups.len() as u64));
    group.bench_function("make_meshes_8_groups", |b| {
        b.iter(|| make_meshes(black_box(&groups)))
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_resample, bench_align, bench_reconstruct);

criterion_main!(benches);
