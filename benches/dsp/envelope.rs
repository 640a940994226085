//! Benchmarks for breakpoint gain automation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use huetone::dsp::envelope::GainAutomation;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let sample_rate = 48_000.0;
    let automation = GainAutomation::attack_hold_release(0.0, 1.0, 0.1, 0.3, 0.5);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Inside the attack ramp
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| {
                automation.render(black_box(&mut buffer), black_box(0.05), sample_rate);
            })
        });

        // Sustained hold
        group.bench_with_input(BenchmarkId::new("hold", size), &size, |b, _| {
            b.iter(|| {
                automation.render(black_box(&mut buffer), black_box(0.4), sample_rate);
            })
        });
    }

    group.finish();
}
