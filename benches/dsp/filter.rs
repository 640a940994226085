//! Benchmarks for the low-pass state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use huetone::dsp::filter::SVFilter;
use huetone::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Piano cutoff, chain Q
        let mut filter = SVFilter::lowpass(2000.0).with_q(0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
