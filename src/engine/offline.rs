use crate::engine::context::{AudioBackend, AudioContext};
use crate::engine::scheduler::{lock, SharedTimeline};
use crate::error::EngineError;

/// A backend with no device. The clock only moves when someone calls
/// [`render_offline`], which makes scheduling fully deterministic.
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    sample_rate: f32,
    failure: Option<OfflineFailure>,
    opened: usize,
}

/// Failure to inject, for exercising the engine's error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineFailure {
    Open,
    Resume,
    /// Each context resumes `n` times, then fails once.
    ResumeAfter(usize),
}

impl OfflineBackend {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            failure: None,
            opened: 0,
        }
    }

    pub fn failing(mut self, failure: OfflineFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// How many contexts this backend has opened.
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl AudioBackend for OfflineBackend {
    fn open(&mut self, timeline: SharedTimeline) -> Result<Box<dyn AudioContext>, EngineError> {
        if self.failure == Some(OfflineFailure::Open) {
            return Err(EngineError::Context("offline backend refused to open".into()));
        }
        lock(&timeline).reset_clock(self.sample_rate);
        self.opened += 1;

        let resumes_left = match self.failure {
            Some(OfflineFailure::Resume) => Some(0),
            Some(OfflineFailure::ResumeAfter(n)) => Some(n),
            _ => None,
        };
        Ok(Box::new(OfflineContext {
            sample_rate: self.sample_rate,
            running: false,
            resumes_left,
        }))
    }
}

pub struct OfflineContext {
    sample_rate: f32,
    running: bool,
    /// Successful resumes left before one fails; `None` never fails.
    resumes_left: Option<usize>,
}

impl AudioContext for OfflineContext {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        match self.resumes_left {
            Some(0) => {
                self.running = false;
                return Err(EngineError::Resume("offline context is suspended".into()));
            }
            Some(n) => self.resumes_left = Some(n - 1),
            None => {}
        }
        self.running = true;
        Ok(())
    }

    fn close(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Pull `seconds` of audio from the timeline, as a device callback would.
pub fn render_offline(timeline: &SharedTimeline, seconds: f64) -> Vec<f32> {
    let mut timeline = lock(timeline);
    let frames = (seconds * timeline.sample_rate() as f64).round() as usize;
    let mut out = vec![0.0; frames];
    timeline.render(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scheduler::Timeline;

    #[test]
    fn opening_resets_the_clock() {
        let timeline = Timeline::shared(8_000.0);
        render_offline(&timeline, 0.5);
        assert_eq!(lock(&timeline).clock_samples(), 4_000);

        let mut backend = OfflineBackend::new(16_000.0);
        let mut context = backend.open(timeline.clone()).unwrap();
        assert_eq!(lock(&timeline).clock_samples(), 0);
        assert_eq!(lock(&timeline).sample_rate(), 16_000.0);

        assert!(!context.is_running());
        context.resume().unwrap();
        assert!(context.is_running());
        assert_eq!(backend.opened(), 1);
    }

    #[test]
    fn injected_failures_surface_as_engine_errors() {
        let timeline = Timeline::shared(8_000.0);
        let mut refusing = OfflineBackend::new(8_000.0).failing(OfflineFailure::Open);
        assert!(matches!(refusing.open(timeline.clone()), Err(EngineError::Context(_))));

        let mut suspended = OfflineBackend::new(8_000.0).failing(OfflineFailure::Resume);
        let mut context = suspended.open(timeline.clone()).unwrap();
        assert!(matches!(context.resume(), Err(EngineError::Resume(_))));

        let mut flaky = OfflineBackend::new(8_000.0).failing(OfflineFailure::ResumeAfter(1));
        let mut context = flaky.open(timeline).unwrap();
        assert!(context.resume().is_ok());
        assert!(matches!(context.resume(), Err(EngineError::Resume(_))));
        assert!(!context.is_running());
    }
}
