/*
Gain Automation
===============

A note's loudness over time is a short list of breakpoints on the audio
clock, each either a jump (`set`) or the end of a straight-line ramp
(`ramp`). The value at any instant depends only on that instant, so the
audio thread can render a block starting anywhere without replaying history.

The per-note shape is attack / hold / release:

  gain
    g ┐     ______________
      │    ╱              ╲
      │   ╱                ╲
    0 └──╱──────────────────╲──→ t
       start  +attack   end-release  end

    set(0, start)
    ramp(g, start + attack)
    set(g, end - release)      hold: nothing moves until here
    ramp(0, end)

Evaluation Rules
----------------

- Before the first breakpoint the value is the first breakpoint's value
  when it is a `set`, otherwise 0.
- A `ramp` interpolates linearly from the previous breakpoint (its time and
  value) to its own. A ramp with nothing before it starts from 0 at time 0.
- After the last breakpoint the value holds.

Breakpoints must be appended in non-decreasing time order.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakpointKind {
    Set,
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub time: f64,
    pub value: f32,
    pub kind: BreakpointKind,
}

/// Where an evaluation instant falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Before the first breakpoint.
    Pending,
    /// Between breakpoints.
    Running,
    /// At or after the last breakpoint.
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct GainAutomation {
    points: Vec<Breakpoint>,
}

impl GainAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attack / hold / release shape for one note.
    ///
    /// `attack` and `release` must already fit inside `duration`.
    pub fn attack_hold_release(start: f64, duration: f64, attack: f64, release: f64, gain: f32) -> Self {
        let end = start + duration;
        let mut automation = Self::new();
        automation
            .set_value_at(0.0, start)
            .linear_ramp_to(gain, start + attack)
            .set_value_at(gain, end - release)
            .linear_ramp_to(0.0, end);
        automation
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) -> &mut Self {
        self.push(Breakpoint {
            time,
            value,
            kind: BreakpointKind::Set,
        })
    }

    pub fn linear_ramp_to(&mut self, value: f32, time: f64) -> &mut Self {
        self.push(Breakpoint {
            time,
            value,
            kind: BreakpointKind::Ramp,
        })
    }

    fn push(&mut self, point: Breakpoint) -> &mut Self {
        debug_assert!(
            self.points.last().map_or(true, |last| last.time <= point.time),
            "breakpoints must be time ordered"
        );
        self.points.push(point);
        self
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    pub fn end_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.time)
    }

    pub fn stage_at(&self, time: f64) -> EnvelopeStage {
        match (self.points.first(), self.points.last()) {
            (Some(first), _) if time < first.time => EnvelopeStage::Pending,
            (_, Some(last)) if time < last.time => EnvelopeStage::Running,
            _ => EnvelopeStage::Finished,
        }
    }

    pub fn value_at(&self, time: f64) -> f32 {
        // Index of the first breakpoint strictly after `time`.
        let next = self.points.partition_point(|p| p.time <= time);

        let Some(upcoming) = self.points.get(next) else {
            return self.points.last().map_or(0.0, |p| p.value);
        };

        let (prev_time, prev_value) = match next.checked_sub(1).map(|i| self.points[i]) {
            Some(prev) => (prev.time, prev.value),
            None if upcoming.kind == BreakpointKind::Set => return 0.0,
            None => (0.0, 0.0),
        };

        match upcoming.kind {
            BreakpointKind::Set => prev_value,
            BreakpointKind::Ramp => {
                let span = upcoming.time - prev_time;
                if span <= 0.0 {
                    return upcoming.value;
                }
                let t = ((time - prev_time) / span) as f32;
                prev_value + (upcoming.value - prev_value) * t
            }
        }
    }

    /// Fill `out` with values starting at `start_time`, one per sample.
    pub fn render(&self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        let step = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start_time + i as f64 * step);
        }
    }
}
