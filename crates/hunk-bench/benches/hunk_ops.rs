//! Criterion micro-benchmarks for hunk reserve, alloc and release.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hunk_arena::{BackendKind, Hunk, HunkConfig};
use hunk_bench::{level_load_profile, reservation_for, uniform_profile};

const BACKENDS: [BackendKind; 3] = [
    BackendKind::ReserveCommit,
    BackendKind::OsHeap,
    BackendKind::PlainHeap,
];

/// Benchmark: begin + end + free with no allocations.
fn bench_begin_free(c: &mut Criterion) {
    let mut group = c.benchmark_group("hunk_begin_free");
    for kind in BACKENDS {
        let config = HunkConfig::new(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &config, |b, config| {
            b.iter(|| {
                let mut hunk = Hunk::begin(16 * 1024 * 1024, config).unwrap();
                black_box(hunk.end());
                hunk.free();
            });
        });
    }
    group.finish();
}

/// Benchmark: a full level-load allocation sequence per backend.
fn bench_level_load(c: &mut Criterion) {
    let sizes = level_load_profile();
    let reserve = reservation_for(&sizes);
    let mut group = c.benchmark_group("hunk_level_load");
    for kind in BACKENDS {
        let config = HunkConfig::new(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &config, |b, config| {
            b.iter(|| {
                let mut hunk = Hunk::begin(reserve, config).unwrap();
                for &size in &sizes {
                    black_box(hunk.alloc(size).unwrap());
                }
                black_box(hunk.end());
                hunk.free();
            });
        });
    }
    group.finish();
}

/// Benchmark: 10K small allocations, the cumulative-commit worst case.
fn bench_small_allocs(c: &mut Criterion) {
    let sizes = uniform_profile(10_000, 24);
    let reserve = reservation_for(&sizes);
    c.bench_function("hunk_small_allocs_10k", |b| {
        b.iter(|| {
            let mut hunk = Hunk::begin(reserve, &HunkConfig::default()).unwrap();
            for &size in &sizes {
                black_box(hunk.alloc(size).unwrap());
            }
            hunk.free();
        });
    });
}

criterion_group!(
    benches,
    bench_begin_free,
    bench_level_load,
    bench_small_allocs
);
criterion_main!(benches);
