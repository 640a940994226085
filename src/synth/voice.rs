use std::fmt;

/// Identifies one chain on a timeline. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain#{}", self.0)
    }
}

/// Which oscillator of a chain a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceRole {
    Main,
    Sub,
}

/// A live oscillator tracked for cleanup. `stop` walks these; natural
/// release removes them. Removing one twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle {
    pub chain: ChainId,
    pub role: VoiceRole,
}

impl VoiceHandle {
    pub fn main(chain: ChainId) -> Self {
        Self {
            chain,
            role: VoiceRole::Main,
        }
    }

    pub fn sub(chain: ChainId) -> Self {
        Self {
            chain,
            role: VoiceRole::Sub,
        }
    }
}
