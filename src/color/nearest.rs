//! Nearest-note resolution.
//!
//! The deterministic bridge from "some color in a photo" to "a note we can
//! play": a linear scan over the catalog in RGB space. With under fifty
//! entries there is nothing to gain from a spatial index.

use crate::color::Rgb;
use crate::error::ColorParseError;
use crate::sequencing::notes::Note;

/// Closest catalog note to `color`. Ties go to the earlier catalog entry.
pub fn nearest_note_rgb(color: Rgb) -> Note {
    let mut best = Note::REST;
    let mut best_distance = u32::MAX;

    for note in Note::all() {
        let distance = color.distance_squared(note.color());
        // Strict comparison keeps the first minimum.
        if distance < best_distance {
            best_distance = distance;
            best = note;
        }
    }

    best
}

/// Closest catalog note to a `#rrggbb` (or `rgb(...)`) color string.
pub fn nearest_note(color: &str) -> Result<Note, ColorParseError> {
    Rgb::from_css(color).map(nearest_note_rgb)
}
