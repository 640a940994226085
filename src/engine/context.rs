//! The audio output seam.
//!
//! The engine never talks to a device directly. A backend opens a context
//! that pulls samples from the shared [`Timeline`](super::scheduler::Timeline)
//! on its own schedule; the engine only places chains on that timeline. The
//! terminal front end provides a cpal backend, tests use
//! [`OfflineBackend`](super::offline::OfflineBackend).

use crate::engine::scheduler::SharedTimeline;
use crate::error::EngineError;

/// A live output that renders the timeline.
pub trait AudioContext {
    fn sample_rate(&self) -> f32;

    /// Start (or restart) pulling audio. Called before every playback.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Release the device. The context is dropped afterwards.
    fn close(&mut self);

    fn is_running(&self) -> bool;
}

/// Opens contexts on demand. Opening resets the timeline clock to zero at
/// the context's sample rate.
pub trait AudioBackend {
    fn open(&mut self, timeline: SharedTimeline) -> Result<Box<dyn AudioContext>, EngineError>;
}
