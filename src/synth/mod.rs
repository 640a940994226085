// Purpose: per-note chains, instrument presets and playback messages
// This layer sits above graph nodes and below the engine timeline

pub mod chain;
pub mod instrument;
pub mod message;
pub mod voice;

pub use chain::{build_chain, build_chain_with_impulse, build_note_chain, preview_chain, Chain, ChainSpec, ChainState};
pub use instrument::{Instrument, InstrumentPreset};
pub use message::{EventReceiver, EventSink, PlaybackEvent};
pub use voice::{ChainId, VoiceHandle, VoiceRole};
