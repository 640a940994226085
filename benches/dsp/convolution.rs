//! Benchmarks for partitioned convolution with the synthetic impulse.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use huetone::dsp::convolution::{decaying_noise_impulse, Convolver, ImpulseSpectrum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::BLOCK_SIZES;

pub fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolution");
    let sample_rate = 48_000.0;
    let mut rng = StdRng::seed_from_u64(42);

    // Building the spectrum happens once per instrument
    let impulse = decaying_noise_impulse(&mut rng, sample_rate, 2.0);
    group.bench_function("spectrum_2s", |b| {
        b.iter(|| ImpulseSpectrum::new(black_box(&impulse)))
    });

    let spectrum = Arc::new(ImpulseSpectrum::new(&impulse));
    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();
        let mut convolver = Convolver::from_spectrum(Arc::clone(&spectrum));
        let mut buffer = input.clone();

        group.bench_with_input(BenchmarkId::new("reverb_2s", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                convolver.process(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
