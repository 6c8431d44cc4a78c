//! Criterion micro-benchmarks for the byte-string primitives.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hunk_sys::{cstr_len, lowercase_in_place};

fn terminated(len: usize) -> Vec<u8> {
    let mut s: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
    s.push(0);
    s
}

/// Benchmark: word-at-a-time length scan against a byte loop.
fn bench_cstr_len(c: &mut Criterion) {
    let mut group = c.benchmark_group("cstr_len");
    for len in [8usize, 64, 1024] {
        let s = terminated(len);
        group.bench_with_input(BenchmarkId::new("word", len), &s, |b, s| {
            b.iter(|| black_box(cstr_len(black_box(s))));
        });
        group.bench_with_input(BenchmarkId::new("byte", len), &s, |b, s| {
            b.iter(|| black_box(black_box(s).iter().position(|&c| c == 0)));
        });
    }
    group.finish();
}

/// Benchmark: lowercasing a mostly-lowercase path.
fn bench_lowercase(c: &mut Criterion) {
    let path = b"players/Male/Tris.MD2\0".to_vec();
    c.bench_function("lowercase_path", |b| {
        b.iter(|| {
            let mut s = path.clone();
            lowercase_in_place(black_box(&mut s));
            black_box(s);
        });
    });
}

criterion_group!(benches, bench_cstr_len, bench_lowercase);
criterion_main!(benches);
