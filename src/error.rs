//! Error types shared across the crate.
//!
//! Every fallible boundary returns one of these instead of panicking, so
//! callers (and tests) can tell *why* something came back empty.

use thiserror::Error;

/// A note name with no entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no color mapping for note `{0}`")]
pub struct UnmappedNote(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got `{0}`")]
    BadHex(String),

    #[error("unrecognized color syntax `{0}`")]
    Unrecognized(String),
}

/// Why a palette extraction produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    #[error("image contains no pixels")]
    EmptyImage,

    #[error("requested color count must be at least 1")]
    NoColorsRequested,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotationError {
    #[error("line {line}: token `{token}` has an unusable duration")]
    InvalidDuration { line: usize, token: String },
}

/// A chain that could not be built. The sequencer skips it and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("frequency {0} Hz is not playable")]
    InvalidFrequency(f32),

    #[error("duration {0} s is not playable")]
    InvalidDuration(f64),

    #[error("start time {0} s is before the audio clock origin")]
    InvalidStartTime(f64),

    #[error("sample rate {0} Hz is not usable")]
    InvalidSampleRate(f32),

    #[error(transparent)]
    Unmapped(#[from] UnmappedNote),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio context unavailable: {0}")]
    Context(String),

    #[error("audio context could not resume: {0}")]
    Resume(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown instrument `{0}` (expected piano, guitar or organ)")]
    UnknownInstrument(String),

    #[error("unknown quantization algorithm `{0}` (expected dominant, kmeans or medianCut)")]
    UnknownAlgorithm(String),

    #[cfg(feature = "serde")]
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
