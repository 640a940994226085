use crate::dsp::envelope::{EnvelopeStage, GainAutomation};
use crate::graph::node::{GraphNode, RenderCtx};

/// Renders a [`GainAutomation`] as a control signal, usually fed to
/// `.amplify()`.
pub struct EnvNode {
    automation: GainAutomation,
    level: f32,
    rendered_until: f64,
}

impl EnvNode {
    pub fn new(automation: GainAutomation) -> Self {
        Self {
            automation,
            level: 0.0,
            rendered_until: 0.0,
        }
    }

    /// Attack / hold / release for a note at `start` lasting `duration`.
    pub fn attack_hold_release(start: f64, duration: f64, attack: f64, release: f64, gain: f32) -> Self {
        Self::new(GainAutomation::attack_hold_release(
            start, duration, attack, release, gain,
        ))
    }

    pub fn automation(&self) -> &GainAutomation {
        &self.automation
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.automation.render(out, ctx.time, ctx.sample_rate);
        self.level = out.last().copied().unwrap_or(self.level);
        self.rendered_until = ctx.time_of(out.len());
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.level)
    }

    fn is_active(&self) -> bool {
        self.automation.stage_at(self.rendered_until) != EnvelopeStage::Finished
    }
}
