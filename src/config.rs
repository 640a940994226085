//! Runtime configuration.
//!
//! Everything has a working default; a TOML file only needs the keys it
//! changes:
//!
//! ```toml
//! [engine]
//! instrument = "organ"
//! palette_note_seconds = 0.5
//!
//! [layout]
//! padding = 32
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::scheduler::DEFAULT_GRACE_SECONDS;
use crate::error::ConfigError;
use crate::layout::LayoutConfig;
use crate::palette::Algorithm;
use crate::sequencing::sequence::PALETTE_NOTE_SECONDS;
use crate::synth::instrument::Instrument;

pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;
/// Default palette size for image scans.
pub const DEFAULT_PALETTE_SIZE: usize = 8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub instrument: Instrument,
    /// Length of each note when a scanned palette is played.
    pub palette_note_seconds: f64,
    /// Extra time a chain outlives its reverb tail before it is dropped.
    pub grace_seconds: f64,
    /// Sample rate for the offline backend.
    pub sample_rate: f32,
    /// Slots in the playback event queue between timeline and UI.
    pub event_queue_capacity: usize,
    /// Gap between "now" and the first scheduled note, so the first chain is
    /// never placed inside a block that is already rendering.
    pub schedule_ahead_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instrument: Instrument::default(),
            palette_note_seconds: PALETTE_NOTE_SECONDS,
            grace_seconds: DEFAULT_GRACE_SECONDS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            schedule_ahead_seconds: 0.05,
        }
    }
}

impl EngineConfig {
    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.instrument = instrument;
        self
    }

    pub fn with_palette_note_seconds(mut self, seconds: f64) -> Self {
        self.palette_note_seconds = seconds;
        self
    }

    pub fn with_grace_seconds(mut self, seconds: f64) -> Self {
        self.grace_seconds = seconds;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    pub fn with_schedule_ahead(mut self, seconds: f64) -> Self {
        self.schedule_ahead_seconds = seconds;
        self
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub colors: usize,
    pub algorithm: Algorithm,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE_SIZE,
            algorithm: Algorithm::default(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub layout: LayoutConfig,
    pub scan: ScanConfig,
}

impl Config {
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    /// Switch instrument by name. An unknown name leaves the current one.
    pub fn set_instrument(&mut self, name: &str) -> Result<(), ConfigError> {
        self.engine.instrument = name.parse()?;
        Ok(())
    }
}
