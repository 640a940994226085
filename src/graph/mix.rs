use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Parallel Signal Mixing
======================

Mix renders two sources and takes a weighted sum:

    output = (A × weight_a) + (B × weight_b)

`a.sum(b)` builds one with both weights at 1. A chain sums its main and sub oscillators, since each already carries its
own gain envelope:

  let layered = main.amplify(main_env).sum(sub.amplify(sub_env));

Both sources receive note_on/note_off events.
*/

pub struct Mix<A, B> {
    pub source_a: A,
    pub source_b: B,
    pub weight_a: f32,
    pub weight_b: f32,
    temp_buffer: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn weighted(source_a: A, source_b: B, weight_a: f32, weight_b: f32) -> Self {
        Mix {
            source_a,
            source_b,
            weight_a,
            weight_b,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<S: GraphNode, M: GraphNode> GraphNode for Mix<S, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source_a.render_block(out, ctx);

        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);

        self.source_b.render_block(frames, ctx);

        for (o, b) in out.iter_mut().zip(frames.iter()) {
            *o = (*o * self.weight_a) + (*b * self.weight_b);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source_a.note_on(ctx);
        self.source_b.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source_a.note_off(ctx);
        self.source_b.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source_a.is_active() || self.source_b.is_active()
    }

    fn get_envelope_level(&self) -> Option<f32> {
        match (
            self.source_a.get_envelope_level(),
            self.source_b.get_envelope_level(),
        ) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}
