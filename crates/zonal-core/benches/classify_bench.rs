//! Criterion benchmarks for the zonal rule engine.
//!
//! Benchmark groups:
//! - `grid`: 100x100 and 500x500 rasters on the three-ring rule set
//! - `features`: 10 000 footprints, shared stream and per-unit streams
//! - `fingerprint`: canonical encoding and hashing of a grid result

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use zonal_core::determinism::fingerprint;
use zonal_core::feature::{FeatureParams, classify_features, classify_features_indexed};
use zonal_core::grid::{CenterPosition, Grid, classify_grid};
use zonal_core::rng::SimRng;
use zonal_core::test_utils::*;

const CELL_SIZE: f64 = 100.0;

fn centered(size: usize) -> CenterPosition {
    let half = size as f64 * CELL_SIZE / 2.0;
    CenterPosition::new(half, half)
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    group.sample_size(30);

    let rules = three_ring_rules();

    for size in [100usize, 500] {
        group.bench_function(format!("{size}x{size}"), |b| {
            b.iter_batched(
                || Grid::filled(size, size, 0),
                |grid| {
                    let mut rng = SimRng::new(42);
                    classify_grid(&rules, grid, centered(size), CELL_SIZE, &mut rng)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("features");
    group.sample_size(30);

    let rules = three_ring_rules();
    let inputs = sample_features(10_000);
    let params = FeatureParams::default();

    group.bench_function("shared_stream_10k", |b| {
        b.iter(|| {
            let mut rng = SimRng::new(42);
            classify_features(&rules, &inputs, &params, &mut rng)
        });
    });

    group.bench_function("indexed_10k", |b| {
        b.iter(|| classify_features_indexed(&rules, &inputs, &params, 42));
    });

    #[cfg(feature = "parallel")]
    group.bench_function("parallel_10k", |b| {
        b.iter(|| zonal_core::feature::classify_features_parallel(&rules, &inputs, &params, 42));
    });

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    group.sample_size(30);

    let rules = three_ring_rules();
    let mut rng = SimRng::new(42);
    let out = classify_grid(
        &rules,
        Grid::filled(500, 500, 0),
        centered(500),
        CELL_SIZE,
        &mut rng,
    );

    group.bench_function("grid_500x500", |b| {
        b.iter(|| fingerprint(&out).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_grid, bench_features, bench_fingerprint);
criterion_main!(benches);
