#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::synth::voice::ChainId;

/// What the timeline reports as it plays, for UI highlighting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A chain's first audible sample was rendered.
    NoteStarted {
        chain: ChainId,
        /// Position in the sequence the chain was built from, if any.
        event_index: Option<usize>,
        time: f64,
    },
    /// A chain finished (tail included) and was dropped.
    NoteReleased {
        chain: ChainId,
        event_index: Option<usize>,
    },
    /// Everything was cut by an explicit stop.
    Stopped,
}

/// Audio-side end of the event channel. Publishing must never block; a
/// full channel drops the event.
pub trait EventSink: Send {
    fn publish(&mut self, event: PlaybackEvent);
}

/// UI-side end of the event channel.
pub trait EventReceiver {
    fn pop(&mut self) -> Option<PlaybackEvent>;
}

#[cfg(feature = "rtrb")]
impl EventSink for Producer<PlaybackEvent> {
    fn publish(&mut self, event: PlaybackEvent) {
        let _ = self.push(event);
    }
}

#[cfg(feature = "rtrb")]
impl EventReceiver for Consumer<PlaybackEvent> {
    fn pop(&mut self) -> Option<PlaybackEvent> {
        Consumer::pop(self).ok()
    }
}
