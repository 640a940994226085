//! Playback engine: turns a [`Sequence`] into chains on a shared timeline.
//!
//! ```text
//!   Sequence ──► AudioEngine::play_sequence
//!                  │  one chain per pitched event, placed back to back
//!                  ▼
//!              Timeline (Arc<Mutex<..>>) ◄── AudioContext pulls samples
//! ```
//!
//! Scheduling is synchronous: every chain of a sequence is built and placed
//! before `play_sequence` returns, and the clock advances by each event's
//! duration even when its chain could not be built. The only fallible step
//! is acquiring or resuming the audio context.

pub mod context;
pub mod offline;
pub mod scheduler;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dsp::convolution::{decaying_noise_impulse, ImpulseSpectrum};
use crate::error::{ChainError, ConfigError, EngineError};
use crate::sequencing::notes::{frequency_of, Note};
use crate::sequencing::sequence::Sequence;
use crate::synth::chain::{build_chain_with_impulse, preview_chain, Chain};
use crate::synth::instrument::Instrument;
use crate::synth::voice::ChainId;

pub use context::{AudioBackend, AudioContext};
pub use offline::{render_offline, OfflineBackend, OfflineFailure};
pub use scheduler::{lock, SharedTimeline, Timeline};

/// What happened to one event of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteOutcome {
    Scheduled(ChainId),
    Rest,
    /// The chain could not be built; the slot stays silent.
    Skipped(ChainError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    pub note: String,
    /// Audio clock time the note starts at.
    pub start_time: f64,
    pub duration_seconds: f64,
    pub outcome: NoteOutcome,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackReport {
    /// One entry per sequence event, in order.
    pub notes: Vec<ScheduledNote>,
    pub start_time: f64,
    /// Last note's end plus the grace delay.
    pub end_time: f64,
}

impl PlaybackReport {
    pub fn scheduled(&self) -> impl Iterator<Item = &ScheduledNote> {
        self.notes
            .iter()
            .filter(|n| matches!(n.outcome, NoteOutcome::Scheduled(_)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ScheduledNote> {
        self.notes
            .iter()
            .filter(|n| matches!(n.outcome, NoteOutcome::Skipped(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStart {
    Started(PlaybackReport),
    /// A session was already running; nothing was scheduled.
    AlreadyPlaying,
}

#[derive(Debug, Clone, Copy)]
struct PlaybackSession {
    start_time: f64,
    end_time: f64,
}

enum Pending {
    Rest,
    Built(Chain),
    Failed(ChainError),
}

pub struct AudioEngine<B: AudioBackend> {
    backend: B,
    context: Option<Box<dyn AudioContext>>,
    timeline: SharedTimeline,
    config: EngineConfig,
    session: Option<PlaybackSession>,
    // One reverb impulse per instrument and sample rate, shared by every chain.
    impulses: HashMap<(Instrument, u32), Arc<ImpulseSpectrum>>,
    rng: StdRng,
}

impl<B: AudioBackend> AudioEngine<B> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        let timeline = Timeline::new(config.sample_rate).with_grace(config.grace_seconds);
        Self {
            backend,
            context: None,
            timeline: Arc::new(Mutex::new(timeline)),
            config,
            session: None,
            impulses: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Make reverb impulses reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.impulses.clear();
        self
    }

    pub fn timeline(&self) -> SharedTimeline {
        Arc::clone(&self.timeline)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn instrument(&self) -> Instrument {
        self.config.instrument
    }

    /// Takes effect for the next sequence; chains already placed keep theirs.
    pub fn set_instrument(&mut self, instrument: Instrument) {
        debug!(%instrument, "instrument selected");
        self.config.instrument = instrument;
    }

    /// An unknown name is an error and leaves the current instrument.
    pub fn set_instrument_by_name(&mut self, name: &str) -> Result<(), ConfigError> {
        let instrument: Instrument = name.parse()?;
        self.set_instrument(instrument);
        Ok(())
    }

    /// Route playback events to a lock-free queue. Replaces any earlier
    /// subscriber.
    #[cfg(feature = "rtrb")]
    pub fn subscribe(&mut self) -> rtrb::Consumer<crate::synth::message::PlaybackEvent> {
        let (producer, consumer) = rtrb::RingBuffer::new(self.config.event_queue_capacity);
        lock(&self.timeline).set_event_sink(Box::new(producer));
        consumer
    }

    /// Audio clock time in seconds.
    pub fn current_time(&self) -> f64 {
        lock(&self.timeline).current_time()
    }

    /// True from `play_sequence` until the last note's end plus grace, or
    /// until `stop`.
    pub fn is_playing(&self) -> bool {
        match self.session {
            Some(session) if self.context.is_some() => self.current_time() < session.end_time,
            _ => false,
        }
    }

    /// Seconds into the current session, if one is playing.
    pub fn elapsed(&self) -> Option<f64> {
        let session = self.session.filter(|_| self.is_playing())?;
        Some((self.current_time() - session.start_time).max(0.0))
    }

    fn ensure_context(&mut self) -> Result<f32, EngineError> {
        if self.context.is_none() {
            info!("opening audio context");
            let timeline = self.timeline();
            self.context = Some(self.backend.open(timeline)?);
        }
        let Some(context) = self.context.as_mut() else {
            return Err(EngineError::Context("no audio context".into()));
        };

        if let Err(err) = context.resume() {
            warn!("audio context failed to resume: {err}");
            context.close();
            self.context = None;
            // The next context restarts the clock, so nothing may outlive this one.
            let stopped = lock(&self.timeline).stop_all();
            self.session = None;
            debug!(stopped, "session torn down");
            return Err(err);
        }
        Ok(context.sample_rate())
    }

    fn impulse_for(&mut self, instrument: Instrument, sample_rate: f32) -> Arc<ImpulseSpectrum> {
        let rng = &mut self.rng;
        let impulse = self
            .impulses
            .entry((instrument, sample_rate.to_bits()))
            .or_insert_with(|| {
                let seconds = instrument.preset().reverb_seconds;
                debug!(%instrument, sample_rate, seconds, "generating reverb impulse");
                Arc::new(ImpulseSpectrum::new(&decaying_noise_impulse(rng, sample_rate, seconds)))
            });
        Arc::clone(impulse)
    }

    /// Schedule every event of `sequence` back to back from now.
    pub fn play_sequence(&mut self, sequence: &Sequence) -> Result<PlaybackStart, EngineError> {
        if self.is_playing() {
            warn!("playback already in progress, ignoring request");
            return Ok(PlaybackStart::AlreadyPlaying);
        }
        self.session = None;

        let sample_rate = self.ensure_context()?;
        let instrument = self.config.instrument;
        let preset = instrument.preset();
        let impulse = self.impulse_for(instrument, sample_rate);

        let start_time = self.current_time() + self.config.schedule_ahead_seconds;
        let mut clock = start_time;
        let mut pending = Vec::with_capacity(sequence.len());

        for (index, event) in sequence.events().iter().enumerate() {
            let built = if event.is_rest() {
                Pending::Rest
            } else {
                let chain = frequency_of(&event.note)
                    .map_err(ChainError::from)
                    .and_then(|frequency| {
                        build_chain_with_impulse(
                            &preset,
                            frequency,
                            clock,
                            event.duration_seconds,
                            sample_rate,
                            Arc::clone(&impulse),
                        )
                    });
                match chain {
                    Ok(chain) => Pending::Built(chain.with_event_index(index)),
                    Err(err) => {
                        warn!(note = %event.note, index, "skipping note: {err}");
                        Pending::Failed(err)
                    }
                }
            };
            pending.push((clock, built));
            clock += event.duration_seconds;
        }

        let end_time = clock + self.config.grace_seconds;
        let notes = {
            let mut timeline = lock(&self.timeline);
            sequence
                .events()
                .iter()
                .zip(pending)
                .map(|(event, (note_start, built))| ScheduledNote {
                    note: event.note.clone(),
                    start_time: note_start,
                    duration_seconds: event.duration_seconds,
                    outcome: match built {
                        Pending::Rest => NoteOutcome::Rest,
                        Pending::Built(chain) => NoteOutcome::Scheduled(chain.start(&mut timeline)),
                        Pending::Failed(err) => NoteOutcome::Skipped(err),
                    },
                })
                .collect()
        };

        self.session = Some(PlaybackSession {
            start_time,
            end_time,
        });
        let report = PlaybackReport {
            notes,
            start_time,
            end_time,
        };
        info!(
            %instrument,
            events = sequence.len(),
            scheduled = report.scheduled().count(),
            skipped = report.skipped().count(),
            seconds = sequence.total_seconds(),
            "playback started"
        );
        Ok(PlaybackStart::Started(report))
    }

    /// Play resolved palette notes at the configured note length.
    pub fn play_palette(&mut self, colors: &[crate::color::Rgb]) -> Result<PlaybackStart, EngineError> {
        let sequence = Sequence::from_palette(colors, self.config.palette_note_seconds);
        self.play_sequence(&sequence)
    }

    /// Audition one note with a short sine blip. Works while a sequence
    /// plays; a rest plays nothing.
    pub fn preview_note(&mut self, note: Note) -> Result<Option<ChainId>, EngineError> {
        if note.is_rest() {
            return Ok(None);
        }
        let sample_rate = self.ensure_context()?;
        let start_time = self.current_time() + self.config.schedule_ahead_seconds;

        match preview_chain(note.frequency(), start_time, sample_rate) {
            Ok(chain) => {
                let id = chain.start(&mut lock(&self.timeline));
                debug!(%note, %id, "preview scheduled");
                Ok(Some(id))
            }
            Err(err) => {
                warn!(%note, "preview skipped: {err}");
                Ok(None)
            }
        }
    }

    /// Cut every tracked oscillator and close the context. Safe at any time.
    pub fn stop(&mut self) {
        let stopped = lock(&self.timeline).stop_all();
        if let Some(mut context) = self.context.take() {
            context.close();
            info!(stopped, "playback stopped");
        }
        self.session = None;
    }
}

impl<B: AudioBackend> Drop for AudioEngine<B> {
    fn drop(&mut self) {
        if let Some(mut context) = self.context.take() {
            context.close();
        }
    }
}
