//! Benchmarks for palette extraction on a photo-sized buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use huetone::palette::{extract_palette, Algorithm};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A 512x512 RGBA gradient with some texture.
fn test_image() -> Vec<u8> {
    let side = 512u32;
    (0..side * side)
        .flat_map(|i| {
            let (x, y) = (i % side, i / side);
            [(x / 2) as u8, (y / 2) as u8, ((x ^ y) & 0xff) as u8, 255]
        })
        .collect()
}

pub fn bench_palette(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/palette");
    group.sample_size(20);
    let image = test_image();

    for algorithm in [Algorithm::Dominant, Algorithm::KMeans, Algorithm::MedianCut] {
        let mut rng = StdRng::seed_from_u64(3);
        group.bench_with_input(BenchmarkId::new(algorithm.to_string(), 8), &8usize, |b, &k| {
            b.iter(|| extract_palette(black_box(&image), k, algorithm, &mut rng))
        });
    }

    group.finish();
}
