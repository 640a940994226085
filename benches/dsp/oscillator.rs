//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use huetone::dsp::oscillator::{OscillatorBlock, Waveform};
use huetone::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            let mut osc = OscillatorBlock::new(waveform);
            group.bench_with_input(BenchmarkId::new(waveform.to_string(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
