//! Benchmarks for the embedding similarity scan
//!
//! Run with: cargo bench --package strategies
//!
//! Uses a synthetic catalog of 20k movies with 384-dimensional embeddings,
//! roughly the size of a sentence-transformer export.

use catalog::MovieId;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::collections::HashMap;
use strategies::similarity::{cosine_similarity, most_similar};

const MOVIES: u32 = 20_000;
const DIMS: usize = 384;

fn synthetic_embeddings() -> HashMap<MovieId, Vec<f32>> {
    (1..=MOVIES)
        .map(|id| {
            let v = (0..DIMS)
                .map(|d| ((id as usize * 31 + d * 17) % 97) as f32 / 97.0)
                .collect();
            (id, v)
        })
        .collect()
}

fn bench_cosine(c: &mut Criterion) {
    let a: Vec<f32> = (0..DIMS).map(|d| d as f32 / DIMS as f32).collect();
    let b: Vec<f32> = (0..DIMS).map(|d| 1.0 - d as f32 / DIMS as f32).collect();

    c.bench_function("cosine_similarity_384", |bench| {
        bench.iter(|| black_box(cosine_similarity(black_box(&a), black_box(&b))))
    });
}

fn bench_most_similar(c: &mut Criterion) {
    let embeddings = synthetic_embeddings();

    c.bench_function("most_similar_20k", |b| {
        b.iter(|| {
            let results = most_similar(black_box(&embeddings), black_box(42), 0.3, 10);
            black_box(results)
        })
    });
}

criterion_group!(benches, bench_cosine, bench_most_similar);
criterion_main!(benches);
