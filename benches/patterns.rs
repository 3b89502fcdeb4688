//! Benchmarks for the pattern layer.
//!
//! Discovery dominates codec cost: one sliding-window count map per
//! candidate length. These benchmarks isolate discovery, the full
//! discover-and-substitute run, and expansion from the rest of the codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tachygraph::prelude::*;

/// Periodic symbol sequence, `len` symbols long.
fn periodic_symbols(len: usize, period: u32) -> Vec<SymbolId> {
    (0..len).map(|i| SymbolId::new(i as u32 % period)).collect()
}

/// Benchmarks discovery alone over ten thousand periodic symbols.
fn bench_discover_periodic(c: &mut Criterion) {
    let symbols = periodic_symbols(10_000, 23);

    c.bench_function("discover_periodic_10k", |b| {
        b.iter(|| {
            let mut compressor = PatternCompressor::new(4, 3, 5);
            let dictionary = compressor.discover(black_box(&symbols));
            black_box(dictionary);
        });
    });
}

/// Benchmarks the full discover-and-substitute run.
fn bench_compress_periodic(c: &mut Criterion) {
    let symbols = periodic_symbols(10_000, 23);

    c.bench_function("compress_periodic_10k", |b| {
        b.iter(|| {
            let mut compressor = PatternCompressor::new(4, 3, 5);
            let run = compressor.compress(black_box(&symbols));
            black_box(run);
        });
    });
}

/// Benchmarks expansion of a compressed token stream.
fn bench_expand_periodic(c: &mut Criterion) {
    let symbols = periodic_symbols(10_000, 23);
    let mut compressor = PatternCompressor::new(4, 3, 5);
    let run = compressor.compress(&symbols);

    c.bench_function("expand_periodic_10k", |b| {
        b.iter(|| {
            let expanded = run.dictionary.expand(black_box(&run.compressed)).unwrap();
            black_box(expanded);
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10); // smaller sample for speed
    targets = bench_discover_periodic, bench_compress_periodic, bench_expand_periodic
);
criterion_main!(benches);
