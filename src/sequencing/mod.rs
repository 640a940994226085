//! Notes, the text notation and the timed sequences built from them.

pub mod notation;
pub mod notes;
pub mod sequence;

pub use notation::{number_lines, parse, Composition, NoteToken};
pub use notes::{color_of, frequency_of, Note, NoteColorEntry, CATALOG};
pub use sequence::{NoteEvent, Sequence, SequenceBuilder, PALETTE_NOTE_SECONDS};
