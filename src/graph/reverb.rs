use std::sync::Arc;

use crate::dsp::convolution::{Convolver, ImpulseSpectrum};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/*
Reverb Node
===========

Adds the convolution reverb in parallel with the untouched signal:

    in ──┬────────────────────→ (× dry) ──┐
         │                                (+) ──→ out
         └──→ [Convolver] ────→ (× wet) ──┘

Both paths run at unity, as a dry connection and a wet send wired to the
same output. The wet path trails the dry path by the convolver's
partition latency.

Example usage:
  let impulse = decaying_noise_impulse(&mut rng, 48_000.0, 2.0);
  let spectrum = Arc::new(ImpulseSpectrum::new(&impulse));
  let voice = OscNode::sine().through(ReverbNode::shared(spectrum));
*/

pub struct ReverbNode {
    convolver: Convolver,
    wet_buffer: Vec<f32>,
}

impl ReverbNode {
    /// Reuse an impulse already transformed for another node.
    pub fn shared(impulse: Arc<ImpulseSpectrum>) -> Self {
        Self {
            convolver: Convolver::from_spectrum(impulse),
            wet_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Seconds the wet path keeps ringing after the input goes silent.
    pub fn tail_seconds(&self, sample_rate: f32) -> f64 {
        self.convolver.tail_len() as f64 / sample_rate as f64
    }
}

impl GraphNode for ReverbNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        // Slice temp buffer to match output size (RT-safe, no allocation)
        let wet = &mut self.wet_buffer[..out.len()];
        wet.copy_from_slice(out);
        self.convolver.process(wet);

        for (o, w) in out.iter_mut().zip(wet.iter()) {
            *o += *w;
        }
    }
}
