//! Benchmarks for a whole sequence scheduled on the timeline.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use huetone::engine::{lock, render_offline, AudioEngine, OfflineBackend};
use huetone::sequencing::parse;
use huetone::{EngineConfig, Sequence};

pub fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/timeline");
    let sample_rate = 48_000.0;
    let melody = parse("C(0.25) E(0.25) G(0.25) Cp(0.25) G(0.25) E(0.25) C(0.5)\nR(0.25) Am(0.5) F(0.5) D(1)");
    let sequence = Sequence::from_composition(&melody);

    // Scheduling cost: build and place every chain
    group.bench_function("schedule", |b| {
        b.iter(|| {
            let config = EngineConfig::default().with_sample_rate(sample_rate);
            let mut engine = AudioEngine::new(OfflineBackend::new(sample_rate), config).with_seed(1);
            engine.play_sequence(black_box(&sequence)).expect("offline backend");
        })
    });

    // Render cost with several overlapping reverb tails
    for &size in &[256usize, 2048] {
        let config = EngineConfig::default().with_sample_rate(sample_rate);
        let mut engine = AudioEngine::new(OfflineBackend::new(sample_rate), config).with_seed(1);
        engine.play_sequence(&sequence).expect("offline backend");
        let timeline = engine.timeline();
        render_offline(&timeline, 1.0);

        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("render", size), &size, |b, _| {
            b.iter(|| {
                lock(&timeline).render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
