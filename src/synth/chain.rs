/*
Note Chains
===========

Every sounded note gets its own small graph, built ahead of time and placed
on the timeline:

    [main osc] × env(main gain) ──┐
                                  (+) ─→ × 0.3 ─→ [low-pass] ─┬──────────→ out
    [sub osc ] × env(sub gain) ───┘       master   min(fc,5k)  └→ [reverb] ─┘
     freq × 1.01                                   Q 0.5

Both oscillators are scheduled for [start, start + duration). Their gain
envelopes ramp up over `attack`, hold, and ramp down over the final
`release` seconds; both are capped at 30% of the (clamped) duration so a
short note still has a body.

Lifecycle
---------

    Built ──start()──→ Scheduled ──clock reaches start──→ Playing
                                                            │
                      Released ←── stop + tail + grace ─────┘
                          ↑
                          └──────── explicit stop (any state)

Durations are clamped to [0.1, 10] seconds. Invalid input (non-positive or
non-finite frequency or duration, negative start, unusable sample rate)
yields a `ChainError` and no chain; the sequencer logs it and moves on.
*/

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::dsp::convolution::{decaying_noise_impulse, ImpulseSpectrum};
use crate::dsp::envelope::GainAutomation;
use crate::dsp::oscillator::Waveform;
use crate::engine::scheduler::Timeline;
use crate::error::ChainError;
use crate::graph::{
    envelope::EnvNode, extensions::NodeExt, filter::FilterNode, node::GraphNode,
    oscillator::OscNode, reverb::ReverbNode, RenderCtx,
};
use crate::sequencing::notes::frequency_of;
use crate::synth::instrument::InstrumentPreset;
use crate::synth::voice::{ChainId, VoiceRole};

pub const MASTER_GAIN: f32 = 0.3;
/// Sub oscillator frequency relative to the main one.
pub const SUB_DETUNE_RATIO: f32 = 1.01;
pub const MAX_CUTOFF_HZ: f32 = 5000.0;
pub const FILTER_Q: f32 = 0.5;
pub const MIN_DURATION: f64 = 0.1;
pub const MAX_DURATION: f64 = 10.0;
/// Largest share of a note's duration that attack (or release) may take.
pub const ENVELOPE_SHARE: f64 = 0.3;

/// Single-note preview: a quiet sine blip.
pub const PREVIEW_SECONDS: f64 = 0.2;
pub const PREVIEW_GAIN: f32 = 0.3;
const PREVIEW_ATTACK: f64 = 0.01;
const PREVIEW_HOLD_UNTIL: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Built,
    Scheduled,
    Playing,
    Released,
}

/// The resolved parameters a chain was built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSpec {
    pub main_waveform: Waveform,
    pub sub_waveform: Option<Waveform>,
    pub main_frequency: f32,
    pub sub_frequency: Option<f32>,
    pub main_gain: f32,
    pub sub_gain: f32,
    pub master_gain: f32,
    pub cutoff_hz: Option<f32>,
    pub start_time: f64,
    /// Clamped duration.
    pub duration: f64,
    /// Capped attack.
    pub attack: f64,
    /// Capped release.
    pub release: f64,
}

impl ChainSpec {
    pub fn stop_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

pub struct Chain {
    graph: Box<dyn GraphNode>,
    spec: ChainSpec,
    tail_seconds: f64,
    state: ChainState,
    event_index: Option<usize>,
}

impl Chain {
    pub fn spec(&self) -> &ChainSpec {
        &self.spec
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ChainState) {
        self.state = state;
    }

    pub fn start_time(&self) -> f64 {
        self.spec.start_time
    }

    pub fn stop_time(&self) -> f64 {
        self.spec.stop_time()
    }

    /// Seconds the reverb keeps sounding after the oscillators stop.
    pub fn tail_seconds(&self) -> f64 {
        self.tail_seconds
    }

    /// When the chain can be dropped without cutting anything audible.
    pub fn release_time(&self, grace_seconds: f64) -> f64 {
        self.stop_time() + self.tail_seconds + grace_seconds
    }

    /// Oscillators this chain contributes to the tracked voice set.
    pub fn voice_roles(&self) -> &'static [VoiceRole] {
        if self.spec.sub_waveform.is_some() {
            &[VoiceRole::Main, VoiceRole::Sub]
        } else {
            &[VoiceRole::Main]
        }
    }

    pub fn event_index(&self) -> Option<usize> {
        self.event_index
    }

    /// Tag the chain with the sequence position it plays.
    pub fn with_event_index(mut self, index: usize) -> Self {
        self.event_index = Some(index);
        self
    }

    /// Hand the chain to the timeline; both oscillators are already set to
    /// start at `start_time` and stop at `start_time + duration`.
    pub fn start(self, timeline: &mut Timeline) -> ChainId {
        timeline.schedule(self)
    }

    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.graph.render_block(out, ctx);
    }

    /// Stop both oscillators at `ctx.time`.
    pub fn cut(&mut self, ctx: &RenderCtx) {
        self.graph.note_off(ctx);
    }
}

fn validate(frequency: f32, start_time: f64, duration: f64, sample_rate: f32) -> Result<f64, ChainError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(ChainError::InvalidSampleRate(sample_rate));
    }
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(ChainError::InvalidFrequency(frequency));
    }
    if !(duration.is_finite() && duration > 0.0) {
        return Err(ChainError::InvalidDuration(duration));
    }
    if !(start_time.is_finite() && start_time >= 0.0) {
        return Err(ChainError::InvalidStartTime(start_time));
    }
    Ok(duration.clamp(MIN_DURATION, MAX_DURATION))
}

/// Attack and release after the 30% cap.
pub fn envelope_times(preset: &InstrumentPreset, duration: f64) -> (f64, f64) {
    let cap = duration * ENVELOPE_SHARE;
    (preset.attack.min(cap), preset.release.min(cap))
}

/// Build a chain with a freshly generated reverb impulse.
pub fn build_chain<R: Rng + ?Sized>(
    preset: &InstrumentPreset,
    frequency: f32,
    start_time: f64,
    duration: f64,
    sample_rate: f32,
    rng: &mut R,
) -> Result<Chain, ChainError> {
    validate(frequency, start_time, duration, sample_rate)?;
    let impulse = decaying_noise_impulse(rng, sample_rate, preset.reverb_seconds);
    build_chain_with_impulse(
        preset,
        frequency,
        start_time,
        duration,
        sample_rate,
        Arc::new(ImpulseSpectrum::new(&impulse)),
    )
}

/// Build a chain around an impulse shared with other chains.
pub fn build_chain_with_impulse(
    preset: &InstrumentPreset,
    frequency: f32,
    start_time: f64,
    duration: f64,
    sample_rate: f32,
    impulse: Arc<ImpulseSpectrum>,
) -> Result<Chain, ChainError> {
    let duration = validate(frequency, start_time, duration, sample_rate)?;
    let (attack, release) = envelope_times(preset, duration);
    let stop_time = start_time + duration;
    let sub_frequency = frequency * SUB_DETUNE_RATIO;
    let cutoff_hz = preset.filter_cutoff_hz.min(MAX_CUTOFF_HZ);

    let main = OscNode::new(preset.main_waveform)
        .with_frequency(frequency)
        .scheduled(start_time, stop_time)
        .amplify(EnvNode::attack_hold_release(
            start_time,
            duration,
            attack,
            release,
            preset.main_gain,
        ));
    let sub = OscNode::new(preset.sub_waveform)
        .with_frequency(sub_frequency)
        .scheduled(start_time, stop_time)
        .amplify(EnvNode::attack_hold_release(
            start_time,
            duration,
            attack,
            release,
            preset.sub_gain,
        ));

    let reverb = ReverbNode::shared(impulse);
    let tail_seconds = reverb.tail_seconds(sample_rate);

    let graph = main
        .sum(sub)
        .gain(MASTER_GAIN)
        .through(FilterNode::lowpass(cutoff_hz).with_q(FILTER_Q))
        .through(reverb);

    debug!(frequency, start_time, duration, attack, release, "chain built");

    Ok(Chain {
        graph: Box::new(graph),
        spec: ChainSpec {
            main_waveform: preset.main_waveform,
            sub_waveform: Some(preset.sub_waveform),
            main_frequency: frequency,
            sub_frequency: Some(sub_frequency),
            main_gain: preset.main_gain,
            sub_gain: preset.sub_gain,
            master_gain: MASTER_GAIN,
            cutoff_hz: Some(cutoff_hz),
            start_time,
            duration,
            attack,
            release,
        },
        tail_seconds,
        state: ChainState::Built,
        event_index: None,
    })
}

/// Resolve `note` and build its chain. Unmapped names are an error.
pub fn build_note_chain<R: Rng + ?Sized>(
    preset: &InstrumentPreset,
    note: &str,
    start_time: f64,
    duration: f64,
    sample_rate: f32,
    rng: &mut R,
) -> Result<Chain, ChainError> {
    let frequency = frequency_of(note)?;
    build_chain(preset, frequency, start_time, duration, sample_rate, rng)
}

/// The short sine blip played when a single note is auditioned:
/// 0 → 0.3 in 10 ms, held to 0.1 s, back to 0 at 0.2 s.
pub fn preview_chain(frequency: f32, start_time: f64, sample_rate: f32) -> Result<Chain, ChainError> {
    validate(frequency, start_time, PREVIEW_SECONDS, sample_rate)?;

    let mut automation = GainAutomation::new();
    automation
        .set_value_at(0.0, start_time)
        .linear_ramp_to(PREVIEW_GAIN, start_time + PREVIEW_ATTACK)
        .set_value_at(PREVIEW_GAIN, start_time + PREVIEW_HOLD_UNTIL)
        .linear_ramp_to(0.0, start_time + PREVIEW_SECONDS);

    let graph = OscNode::sine()
        .with_frequency(frequency)
        .scheduled(start_time, start_time + PREVIEW_SECONDS)
        .amplify(EnvNode::new(automation));

    Ok(Chain {
        graph: Box::new(graph),
        spec: ChainSpec {
            main_waveform: Waveform::Sine,
            sub_waveform: None,
            main_frequency: frequency,
            sub_frequency: None,
            main_gain: PREVIEW_GAIN,
            sub_gain: 0.0,
            master_gain: 1.0,
            cutoff_hz: None,
            start_time,
            duration: PREVIEW_SECONDS,
            attack: PREVIEW_ATTACK,
            release: PREVIEW_SECONDS - PREVIEW_HOLD_UNTIL,
        },
        tail_seconds: 0.0,
        state: ChainState::Built,
        event_index: None,
    })
}
