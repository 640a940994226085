//! Benchmarks for complete note chains.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use huetone::dsp::convolution::{decaying_noise_impulse, ImpulseSpectrum};
use huetone::graph::node::RenderCtx;
use huetone::synth::chain::build_chain_with_impulse;
use huetone::Instrument;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::BLOCK_SIZES;

pub fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chains");
    let sample_rate = 48_000.0;
    let mut rng = StdRng::seed_from_u64(7);

    for instrument in Instrument::ALL {
        let preset = instrument.preset();
        let impulse = Arc::new(ImpulseSpectrum::new(&decaying_noise_impulse(
            &mut rng,
            sample_rate,
            preset.reverb_seconds,
        )));

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            // A long note so the bench stays inside the hold stage
            let mut chain =
                build_chain_with_impulse(&preset, 220.0, 0.0, 10.0, sample_rate, Arc::clone(&impulse))
                    .expect("valid chain parameters");
            let ctx = RenderCtx::from_freq(sample_rate, 0.0, 1.0).at(1.0);

            group.bench_with_input(BenchmarkId::new(instrument.name(), size), &size, |b, _| {
                b.iter(|| {
                    chain.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
