use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// One sample at `phase` in `[0, 1)`.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        })
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            other => Err(format!("unknown waveform `{other}`")),
        }
    }
}

/// Phase-accumulating oscillator. Phase is kept in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    pub waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = self.waveform.sample(self.phase);
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        value
    }

    /// Fill `out` at `ctx.frequency`.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx.frequency, ctx.sample_rate);
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveforms_hit_their_landmarks() {
        assert!(Waveform::Sine.sample(0.25) > 0.999);
        assert_eq!(Waveform::Square.sample(0.1), 1.0);
        assert_eq!(Waveform::Square.sample(0.6), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(0.0), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
    }

    #[test]
    fn rendered_sine_matches_closed_form() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, &ctx);

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / 48_000.0).sin();
        assert!((buffer[n] - expected).abs() < 1e-4);
    }

    #[test]
    fn phase_stays_wrapped() {
        let mut osc = OscillatorBlock::sawtooth();
        for _ in 0..10_000 {
            osc.next_sample(987.77, 44_100.0);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn names_parse() {
        assert_eq!("Sawtooth".parse::<Waveform>(), Ok(Waveform::Sawtooth));
        assert!("pulse".parse::<Waveform>().is_err());
        assert_eq!(Waveform::Triangle.to_string(), "triangle");
    }
}
