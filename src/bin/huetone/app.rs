//! Audio output and the interactive player

use std::sync::{Arc, Mutex};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::error;

use huetone::engine::{lock, AudioBackend, AudioContext, AudioEngine, SharedTimeline};
use huetone::error::EngineError;
use huetone::layout::BarLayout;
use huetone::sequencing::Composition;
use huetone::{Config, Sequence, MAX_BLOCK_SIZE};

use super::ui::UiApp;

/// Samples kept for the oscilloscope
const SCOPE_QUEUE_SIZE: usize = 8192;

/// Opens the default cpal output device. Every stream it builds renders the
/// shared timeline and copies the mono mix to all channels.
pub struct CpalBackend {
    // Shared by every stream this backend opens, so the scope survives a
    // stop/play cycle.
    scope_tx: Arc<Mutex<Producer<f32>>>,
}

impl CpalBackend {
    pub fn new() -> (Self, Consumer<f32>) {
        let (tx, rx) = RingBuffer::new(SCOPE_QUEUE_SIZE);
        (
            Self {
                scope_tx: Arc::new(Mutex::new(tx)),
            },
            rx,
        )
    }
}

impl AudioBackend for CpalBackend {
    fn open(&mut self, timeline: SharedTimeline) -> Result<Box<dyn AudioContext>, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::Context("no default output device available".into()))?;
        let config = device
            .default_output_config()
            .map_err(|err| EngineError::Context(format!("failed to fetch output config: {err}")))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        lock(&timeline).reset_clock(sample_rate);

        let scope_tx = Arc::clone(&self.scope_tx);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;
                    let mut timeline = lock(&timeline);
                    let mut scope = scope_tx.try_lock().ok();

                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];
                        timeline.render(block);

                        // Copy to output (mono to all channels)
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }
                        if let Some(tx) = scope.as_mut() {
                            for &s in block.iter() {
                                let _ = tx.push(s);
                            }
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|err| EngineError::Context(format!("failed to build output stream: {err}")))?;

        Ok(Box::new(CpalContext {
            stream,
            sample_rate,
            running: false,
        }))
    }
}

struct CpalContext {
    stream: cpal::Stream,
    sample_rate: f32,
    running: bool,
}

impl AudioContext for CpalContext {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.stream
            .play()
            .map_err(|err| EngineError::Resume(err.to_string()))?;
        self.running = true;
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.stream.pause();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// A composition ready to play, with the engine and views around it.
pub struct Player {
    composition: Composition,
    sequence: Sequence,
    config: Config,
}

impl Player {
    pub fn new(composition: Composition, config: Config) -> EyreResult<Self> {
        let sequence = Sequence::from_composition(&composition);
        if sequence.is_empty() {
            return Err(eyre!("nothing to play"));
        }
        Ok(Self {
            composition,
            sequence,
            config,
        })
    }

    /// Take over the terminal and start playing.
    pub fn run(self) -> EyreResult<()> {
        let (backend, scope_rx) = CpalBackend::new();
        let mut engine = AudioEngine::new(backend, self.config.engine.clone());
        let events_rx = engine.subscribe();
        let layout = BarLayout::full(&self.composition, &self.config.layout);

        engine
            .play_sequence(&self.sequence)
            .wrap_err("failed to start playback")?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(engine, self.sequence, layout, events_rx, scope_rx).run(&mut terminal);
        ratatui::restore();
        result
    }
}
