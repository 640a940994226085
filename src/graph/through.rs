use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through renders the source into the output buffer, then lets the effect
process that buffer in place. Every note chain ends in two of these:

    layered oscillators ──→ [low-pass] ──→ [reverb] ──→ output

     let chain = main.sum(sub)
         .gain(0.3)
         .through(FilterNode::lowpass(2000.0))
         .through(ReverbNode::shared(impulse));

Through vs Amplify vs Mix:
  Through: serial (source → effect)
  Amplify: product (signal × control)
  Mix:     weighted sum of two parallel sources

Note events go to both sides; the envelope level is reported from the
source, since effects carry none.
*/

pub struct Through<S, F> {
    source: S,
    filter: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.filter.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.filter.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source.note_off(ctx);
        self.filter.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active() || self.filter.is_active()
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.source.get_envelope_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode,
    };

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0, 1.0)
    }

    #[test]
    fn renders_source_then_filter() {
        let mut node = OscNode::sawtooth().through(FilterNode::lowpass(200.0));
        let mut raw = OscNode::sawtooth();
        let (mut filtered, mut unfiltered) = (vec![0.0; 256], vec![0.0; 256]);
        node.render_block(&mut filtered, &ctx());
        raw.render_block(&mut unfiltered, &ctx());

        assert!(filtered.iter().all(|&sample| sample.is_finite()));
        assert_ne!(filtered, unfiltered);
    }

    #[test]
    fn forwards_note_off_to_the_source() {
        let mut node = OscNode::sine()
            .scheduled(0.0, 10.0)
            .through(FilterNode::lowpass(1_000.0));
        node.note_off(&ctx().at(0.0));

        let mut buffer = vec![0.0; 64];
        node.render_block(&mut buffer, &ctx());
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn reports_envelope_level_from_source() {
        let node = OscNode::sine().amplify(EnvNode::attack_hold_release(0.0, 1.0, 0.1, 0.1, 1.0));
        let through = node.through(FilterNode::lowpass(1_000.0));

        assert!(through.get_envelope_level().is_some());
    }
}
