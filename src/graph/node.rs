/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz), for nodes that track it
/// - velocity: Intensity/loudness (0.0-1.0)
/// - time: Audio clock time of the block's first sample, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
    pub time: f64,
}

impl RenderCtx {
    /// Context at clock time zero.
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
            time: 0.0,
        }
    }

    /// Same context, moved to another point on the audio clock.
    pub fn at(self, time: f64) -> Self {
        Self { time, ..self }
    }

    /// Clock time of sample `index` within the block.
    #[inline]
    pub fn time_of(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render blocks and respond to note events. Scheduled nodes compare
/// `ctx.time` against their own start/stop times, so a block may begin
/// anywhere on the clock.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a note starts
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_on(&mut self, _ctx: &RenderCtx) {
        // Default: do nothing
    }

    /// Triggered when a note is cut off at `ctx.time`
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_off(&mut self, _ctx: &RenderCtx) {
        // Default: do nothing
    }

    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn get_envelope_level(&self) -> Option<f32> {
        (**self).get_envelope_level()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
