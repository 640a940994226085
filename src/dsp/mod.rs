//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Components here only do signal math. Anything that knows about notes,
//! scheduling or voices lives in `graph` and `synth`. Once constructed they
//! are allocation-free and realtime-safe.

/// Partitioned FFT convolution and the synthetic reverb impulse.
pub mod convolution;
/// Breakpoint gain automation (attack / hold / release).
pub mod envelope;
/// Low-pass state-variable filter.
pub mod filter;
/// Phase-accumulating oscillator waveforms.
pub mod oscillator;

pub use envelope::{EnvelopeStage, GainAutomation};
pub use oscillator::Waveform;
