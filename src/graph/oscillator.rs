use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Scheduled Oscillator
====================

The sound source of every chain. Each note layers two of these: the main
tone at the note's frequency and a sub tone detuned upward by 1% so the
pair beats slowly against each other.

Waveforms and their character:

  Sine      fundamental only          smooth, pure (piano main)
  Triangle  odd harmonics, 1/n²       soft, mellow (piano/guitar sub)
  Sawtooth  all harmonics, 1/n        bright, buzzy (guitar main)
  Square    odd harmonics, 1/n        hollow, reedy (organ)

Scheduling
----------

An oscillator only sounds inside [start, stop) on the audio clock:

    clock   ───────|=========================|──────────→
                 start       sounding       stop

Outside that window it writes silence and does not advance its phase, so
the first sample at `start` always begins at phase 0. `note_off` moves the
stop time to "now" (never later than the scheduled stop). Once the clock has
passed the stop time the oscillator reports itself inactive.

Example usage:
  let main = OscNode::sine().with_frequency(261.63).scheduled(1.0, 2.0);
  let sub = OscNode::triangle().with_frequency(261.63 * 1.01).scheduled(1.0, 2.0);
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency and uses this instead.
    frequency: Option<f32>,
    start_time: f64,
    stop_time: f64,
    /// Clock time just past the last rendered sample.
    rendered_until: f64,
}

impl OscNode {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: None,
            start_time: 0.0,
            stop_time: f64::INFINITY,
            rendered_until: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    /// Set a fixed frequency, ignoring the pitch from RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.frequency = Some(freq);
        self
    }

    /// Sound only inside `[start, stop)` on the audio clock.
    pub fn scheduled(mut self, start: f64, stop: f64) -> Self {
        self.start_time = start;
        self.stop_time = stop;
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform
    }

    pub fn frequency(&self) -> Option<f32> {
        self.frequency
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Cut the oscillator at `time`. Stopping an already-stopped oscillator
    /// is harmless.
    pub fn stop_at(&mut self, time: f64) {
        self.stop_time = self.stop_time.min(time);
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let frequency = self.frequency.unwrap_or(ctx.frequency);

        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.time_of(i);
            *sample = if t >= self.start_time && t < self.stop_time {
                self.osc.next_sample(frequency, ctx.sample_rate)
            } else {
                0.0
            };
        }

        self.rendered_until = ctx.time_of(out.len());
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.stop_at(ctx.time);
    }

    fn is_active(&self) -> bool {
        self.rendered_until < self.stop_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_freq(sample_rate, 440.0, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fixed_frequency_ignores_context_pitch() {
        let ctx = RenderCtx::from_freq(8_000.0, 100.0, 1.0);
        let mut fixed = OscNode::sawtooth().with_frequency(1_000.0);
        let mut tracked = OscNode::sawtooth().with_frequency(1_000.0);
        let (mut a, mut b) = (vec![0.0; 16], vec![0.0; 16]);
        fixed.render_block(&mut a, &ctx);
        tracked.render_block(&mut b, &RenderCtx::from_freq(8_000.0, 5.0, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn silent_outside_its_window() {
        // 10 samples per second keeps the arithmetic readable.
        let ctx = RenderCtx::from_freq(10.0, 1.0, 1.0);
        let mut osc = OscNode::square().with_frequency(1.0).scheduled(0.5, 1.0);

        let mut buffer = vec![9.0f32; 15];
        osc.render_block(&mut buffer, &ctx);

        assert!(buffer[..5].iter().all(|&s| s == 0.0));
        assert!(buffer[5..10].iter().all(|&s| s != 0.0));
        assert!(buffer[10..].iter().all(|&s| s == 0.0));
        assert!(!osc.is_active());
    }

    #[test]
    fn note_off_cuts_early_and_never_extends() {
        let ctx = RenderCtx::from_freq(10.0, 1.0, 1.0);
        let mut osc = OscNode::sine().scheduled(0.0, 2.0);

        osc.note_off(&ctx.at(0.5));
        assert_eq!(osc.stop_time(), 0.5);
        osc.note_off(&ctx.at(1.5));
        assert_eq!(osc.stop_time(), 0.5);

        let mut buffer = vec![0.0f32; 10];
        osc.render_block(&mut buffer, &ctx.at(0.6));
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn active_until_the_clock_passes_stop() {
        let ctx = RenderCtx::from_freq(10.0, 1.0, 1.0);
        let mut osc = OscNode::sine().scheduled(0.0, 1.0);
        let mut buffer = vec![0.0f32; 5];

        osc.render_block(&mut buffer, &ctx);
        assert!(osc.is_active());
        osc.render_block(&mut buffer, &ctx.at(0.5));
        assert!(!osc.is_active());
    }
}
