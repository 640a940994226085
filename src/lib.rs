pub mod color; // RGB values and nearest-note resolution
pub mod config;
pub mod dsp;
pub mod engine; // Timeline, audio contexts and sequence playback
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod layout;
pub mod palette; // Image color quantization
pub mod sequencing; // Note catalog, notation and timed sequences
pub mod synth; // Per-note chains and instrument presets

pub use color::Rgb;
pub use config::{Config, EngineConfig};
pub use engine::{AudioEngine, PlaybackReport, PlaybackStart};
pub use palette::{Algorithm, Palette};
pub use sequencing::{Note, Sequence};
pub use synth::Instrument;

pub const MAX_BLOCK_SIZE: usize = 2048;
