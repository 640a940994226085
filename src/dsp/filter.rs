use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

/*
Low-pass State-Variable Filter
==============================

Trapezoidal (topology-preserving) SVF. Only the low-pass output is used:
everything above the cutoff rolls off at 12 dB/octave, which takes the fizz
off raw sawtooth and square partials.

Damping is expressed as Q, with k = 1/Q:

    Q      k     response at cutoff
    ----   ---   --------------------------------
    0.5    2.0   critically damped, no peak (default)
    0.707  1.41  Butterworth, maximally flat
    > 1    < 1   resonant bump

Cutoff is pre-warped so the digital response crosses -3 dB (at Q 0.707) at
the requested frequency.
*/

pub const DEFAULT_Q: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // first integrator state
    ic2eq: f32, // second integrator state

    pub cutoff_hz: f32,
    pub q: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: DEFAULT_Q,
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.q = q;
        self
    }

    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        // Keep the cutoff below Nyquist so tan() stays finite.
        let cutoff = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        (TAU * cutoff / (2.0 * sample_rate)).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx.sample_rate);
        let k = 1.0 / self.q.max(0.01);

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }
}
