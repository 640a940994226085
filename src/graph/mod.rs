//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what a note chain
//! needs: a shared audio clock, block-based rendering and note-off. The
//! `extensions` module adds the fluent helpers chains are written with.

/// Multiply a signal by a control signal, or by a fixed gain.
pub mod amplify;
/// Gain automation rendered as a control signal.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.sum()`, `.through()`, ...).
pub mod extensions;
/// Low-pass filter node.
pub mod filter;
/// Weighted sums of parallel graphs.
pub mod mix;
/// Core traits shared by all graph nodes.
pub mod node;
/// Oscillators scheduled on the audio clock.
pub mod oscillator;
/// Convolution reverb with dry/wet paths.
pub mod reverb;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use extensions::NodeExt;
pub use node::{GraphNode, RenderCtx};
