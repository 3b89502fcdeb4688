//! Benchmarks for the end-to-end codec path.
//!
//! These measure full compress and reconstruct runs over deterministic
//! prose-like input, covering chunking, ontology linking, digest folding,
//! fingerprinting, and pattern substitution in one pass.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tachygraph::prelude::*;

/// Deterministic prose-like input with mixed repetition.
fn sample_text(repeats: usize) -> String {
    let mut text = String::new();
    for i in 0..repeats {
        text.push_str("the quick brown fox jumps over the lazy dog ");
        text.push_str(&format!("sentence {} of the corpus. ", i % 7));
    }
    text
}

/// Benchmarks one full compress over roughly 7 KB of text.
fn bench_compress_prose(c: &mut Criterion) {
    let codec = Tachygraph::new();
    let text = sample_text(100);

    c.bench_function("compress_prose_100", |b| {
        b.iter(|| {
            let artifact = codec.compress(black_box(&text)).unwrap();
            black_box(artifact);
        });
    });
}

/// Benchmarks reconstruction from a prepared artifact.
fn bench_reconstruct_prose(c: &mut Criterion) {
    let codec = Tachygraph::new();
    let artifact = codec.compress(&sample_text(100)).unwrap();

    c.bench_function("reconstruct_prose_100", |b| {
        b.iter(|| {
            let text = codec.reconstruct(black_box(&artifact));
            black_box(text);
        });
    });
}

/// Benchmarks verification, which expands the pattern layer and rebuilds
/// the text.
fn bench_verify_prose(c: &mut Criterion) {
    let codec = Tachygraph::new();
    let artifact = codec.compress(&sample_text(100)).unwrap();

    c.bench_function("verify_prose_100", |b| {
        b.iter(|| {
            assert!(codec.verify(black_box(&artifact)));
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10); // smaller sample for speed
    targets = bench_compress_prose, bench_reconstruct_prose, bench_verify_prose
);
criterion_main!(benches);
