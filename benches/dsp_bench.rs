//! Benchmarks for DSP primitives and real-world scenarios.
//!
//! Run with: cargo bench
//!
//! Everything on the audio path must finish well inside the callback
//! deadline. Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (oscillator, filter, envelope, convolution)
//!   - scenarios/*  Note chains, a scheduled sequence and palette extraction

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_envelope,
    dsp::bench_convolution,
    // Real-world scenarios
    scenarios::bench_chains,
    scenarios::bench_timeline,
    scenarios::bench_palette,
);
criterion_main!(benches);
