/*
Timeline
========

The timeline is the meeting point of the control side (which places chains)
and the audio callback (which pulls samples). It owns:

  - the audio clock, counted in samples since the context opened
  - every chain that has been started and not yet released
  - the set of tracked oscillator handles, two per note chain, each
    dropped once its oscillator has stopped

    control thread                      audio callback
    ──────────────                      ──────────────
    chain.start(&mut timeline) ──┐   ┌── timeline.render(out)
    timeline.stop_all()  ────────┤   │     mix every started chain
                                 ▼   ▼     advance the clock
                         Arc<Mutex<Timeline>>
                                           drop chains past their release

Both sides mutate it under the same lock, so a chain is either released
by the clock or cut by `stop_all`, never both. Removing a handle that is
already gone is a no-op.

Rendering is sample accurate: each chunk is rendered with its clock time
in the RenderCtx, and every oscillator decides per sample whether it is
inside its window. Chains whose start lies beyond the chunk are skipped
entirely.
*/

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::graph::RenderCtx;
use crate::synth::chain::{Chain, ChainState};
use crate::synth::message::{EventSink, PlaybackEvent};
use crate::synth::voice::{ChainId, VoiceHandle};
use crate::MAX_BLOCK_SIZE;

/// Extra time an oscillator stays tracked after it stops, and a chain is
/// kept after its reverb tail ends.
pub const DEFAULT_GRACE_SECONDS: f64 = 0.1;

pub type SharedTimeline = Arc<Mutex<Timeline>>;

/// Lock a shared timeline. A panic on the other side of the lock leaves the
/// timeline itself consistent, so poisoning is ignored.
pub fn lock(timeline: &SharedTimeline) -> MutexGuard<'_, Timeline> {
    timeline.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Timeline {
    sample_rate: f32,
    clock_samples: u64,
    chains: Vec<(ChainId, Chain)>,
    tracked: HashSet<VoiceHandle>,
    next_id: u64,
    grace_seconds: f64,
    chain_buffer: Vec<f32>,
    events: Option<Box<dyn EventSink>>,
}

impl Timeline {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            clock_samples: 0,
            chains: Vec::new(),
            tracked: HashSet::new(),
            next_id: 0,
            grace_seconds: DEFAULT_GRACE_SECONDS,
            chain_buffer: vec![0.0; MAX_BLOCK_SIZE],
            events: None,
        }
    }

    pub fn shared(sample_rate: f32) -> SharedTimeline {
        Arc::new(Mutex::new(Self::new(sample_rate)))
    }

    pub fn with_grace(mut self, grace_seconds: f64) -> Self {
        self.grace_seconds = grace_seconds;
        self
    }

    pub fn set_grace(&mut self, grace_seconds: f64) {
        self.grace_seconds = grace_seconds;
    }

    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.events = Some(sink);
    }

    /// Restart the clock at zero for a new context. Only valid while idle.
    pub fn reset_clock(&mut self, sample_rate: f32) {
        debug_assert!(self.chains.is_empty(), "clock reset with live chains");
        self.sample_rate = sample_rate;
        self.clock_samples = 0;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn clock_samples(&self) -> u64 {
        self.clock_samples
    }

    /// Clock time in seconds.
    pub fn current_time(&self) -> f64 {
        self.clock_samples as f64 / self.sample_rate as f64
    }

    pub fn tracked_voices(&self) -> &HashSet<VoiceHandle> {
        &self.tracked
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn is_idle(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn chain_state(&self, id: ChainId) -> Option<ChainState> {
        self.chains
            .iter()
            .find(|(chain_id, _)| *chain_id == id)
            .map(|(_, chain)| chain.state())
    }

    /// Take ownership of a built chain and track its oscillators.
    pub fn schedule(&mut self, mut chain: Chain) -> ChainId {
        let id = ChainId(self.next_id);
        self.next_id += 1;

        for &role in chain.voice_roles() {
            self.tracked.insert(VoiceHandle { chain: id, role });
        }
        chain.set_state(ChainState::Scheduled);
        trace!(%id, start = chain.start_time(), "chain scheduled");
        self.chains.push((id, chain));
        id
    }

    /// Mix every started chain into `out` and advance the clock.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let start = self.current_time();
        let end = start + out.len() as f64 / self.sample_rate as f64;
        let ctx = RenderCtx::from_freq(self.sample_rate, 0.0, 1.0).at(start);

        let Timeline {
            chains,
            chain_buffer,
            events,
            ..
        } = self;

        for (id, chain) in chains.iter_mut() {
            if chain.start_time() >= end {
                continue;
            }
            if chain.state() == ChainState::Scheduled {
                chain.set_state(ChainState::Playing);
                if let Some(sink) = events.as_mut() {
                    sink.publish(PlaybackEvent::NoteStarted {
                        chain: *id,
                        event_index: chain.event_index(),
                        time: chain.start_time(),
                    });
                }
            }

            let buffer = &mut chain_buffer[..out.len()];
            buffer.fill(0.0);
            chain.render(buffer, &ctx);
            for (o, s) in out.iter_mut().zip(buffer.iter()) {
                *o += *s;
            }
        }

        self.clock_samples += out.len() as u64;
        self.release_finished();
    }

    fn release_finished(&mut self) {
        let now = self.current_time();
        let grace = self.grace_seconds;
        let Timeline {
            chains,
            tracked,
            events,
            ..
        } = self;

        chains.retain_mut(|(id, chain)| {
            // Oscillators are done at their stop time; the tail may ring on.
            if now >= chain.stop_time() + grace {
                for &role in chain.voice_roles() {
                    tracked.remove(&VoiceHandle { chain: *id, role });
                }
            }
            if now < chain.release_time(grace) {
                return true;
            }
            chain.set_state(ChainState::Released);
            if let Some(sink) = events.as_mut() {
                sink.publish(PlaybackEvent::NoteReleased {
                    chain: *id,
                    event_index: chain.event_index(),
                });
            }
            trace!(%id, "chain released");
            false
        });
    }

    /// Cut every oscillator now and forget every chain. Returns how many
    /// tracked handles were stopped.
    pub fn stop_all(&mut self) -> usize {
        let ctx = RenderCtx::from_freq(self.sample_rate, 0.0, 1.0).at(self.current_time());
        for (_, chain) in self.chains.iter_mut() {
            chain.cut(&ctx);
            chain.set_state(ChainState::Released);
        }
        self.chains.clear();

        let stopped = self.tracked.len();
        self.tracked.clear();
        if let Some(sink) = self.events.as_mut() {
            sink.publish(PlaybackEvent::Stopped);
        }
        debug!(stopped, "timeline stopped");
        stopped
    }
}
