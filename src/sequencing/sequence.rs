use crate::color::nearest::nearest_note_rgb;
use crate::color::Rgb;
use crate::layout::BarLayout;
use crate::sequencing::notation::Composition;
use crate::sequencing::notes::Note;

/// Seconds each palette color sounds for when a scanned image is played.
pub const PALETTE_NOTE_SECONDS: f64 = 0.3;

/// One note (or rest) at a fixed offset from the start of its sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Note name as written; may be unmapped.
    pub note: String,
    pub duration_seconds: f64,
    pub start_offset_seconds: f64,
}

impl NoteEvent {
    pub fn end_offset_seconds(&self) -> f64 {
        self.start_offset_seconds + self.duration_seconds
    }

    pub fn resolve(&self) -> Option<Note> {
        Note::from_name(&self.note)
    }

    pub fn is_rest(&self) -> bool {
        self.resolve().is_some_and(Note::is_rest)
    }
}

/// Events laid end to end: each starts exactly where the previous one ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    events: Vec<NoteEvent>,
}

impl Sequence {
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::default()
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_seconds(&self) -> f64 {
        self.events.last().map_or(0.0, NoteEvent::end_offset_seconds)
    }

    /// Event sounding at `offset` seconds from the start, if any.
    pub fn event_at(&self, offset: f64) -> Option<(usize, &NoteEvent)> {
        self.events
            .iter()
            .enumerate()
            .find(|(_, e)| offset >= e.start_offset_seconds && offset < e.end_offset_seconds())
    }

    /// Flatten every parsed line into one back-to-back run.
    pub fn from_composition(composition: &Composition) -> Self {
        composition
            .tokens()
            .fold(Sequence::builder(), |builder, token| {
                builder.note(token.name.clone(), token.duration_seconds)
            })
            .build()
    }

    /// Read rendered bars back into events. A bar whose color is not a
    /// catalog color is skipped and does not advance time.
    pub fn from_bars(layout: &BarLayout) -> Self {
        let scale = layout.scale.pixels_per_second();
        layout
            .rows
            .iter()
            .flat_map(|row| row.bars.iter())
            .filter_map(|bar| Note::from_color(bar.color).map(|note| (note, bar.width)))
            .filter(|&(_, width)| width > 0)
            .fold(Sequence::builder(), |builder, (note, width)| {
                builder.note(note.name(), width as f64 / scale)
            })
            .build()
    }

    /// Resolve each palette color to its nearest note and give every pitched
    /// note `note_seconds`. Rests are skipped without advancing time.
    pub fn from_palette(colors: &[Rgb], note_seconds: f64) -> Self {
        colors
            .iter()
            .map(|&color| nearest_note_rgb(color))
            .filter(|note| !note.is_rest())
            .fold(Sequence::builder(), |builder, note| {
                builder.note(note.name(), note_seconds)
            })
            .build()
    }
}

impl Sequence {
    /// Write the events back out as one line of notation.
    pub fn to_notation(&self) -> String {
        self.events
            .iter()
            .map(|e| format!("{}({})", e.note, e.duration_seconds))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Appends events at a running cursor so offsets can never drift.
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    events: Vec<NoteEvent>,
    cursor_seconds: f64,
}

impl SequenceBuilder {
    /// Append a note (or rest, or unmapped name) lasting `duration_seconds`.
    pub fn note(mut self, name: impl Into<String>, duration_seconds: f64) -> Self {
        self.events.push(NoteEvent {
            note: name.into(),
            duration_seconds,
            start_offset_seconds: self.cursor_seconds,
        });
        self.cursor_seconds += duration_seconds;
        self
    }

    /// Append a rest event.
    pub fn rest(self, duration_seconds: f64) -> Self {
        self.note(Note::REST.name(), duration_seconds)
    }

    pub fn build(self) -> Sequence {
        Sequence {
            events: self.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConfig;
    use crate::sequencing::notation::parse;

    fn assert_back_to_back(sequence: &Sequence) {
        for pair in sequence.events().windows(2) {
            assert!((pair[1].start_offset_seconds - pair[0].end_offset_seconds()).abs() < 1e-12);
        }
    }

    #[test]
    fn composition_flattens_back_to_back() {
        let sequence = Sequence::from_composition(&parse("C(1) D(0.5)\nR(2) Xx(1)"));
        let offsets: Vec<f64> = sequence.events().iter().map(|e| e.start_offset_seconds).collect();
        assert_eq!(offsets, vec![0.0, 1.0, 1.5, 3.5]);
        assert_eq!(sequence.total_seconds(), 4.5);
        assert!(sequence.events()[2].is_rest());
        assert_eq!(sequence.events()[3].resolve(), None);
        assert_back_to_back(&sequence);
    }

    #[test]
    fn notation_text_parses_back_to_the_same_events() {
        let sequence = Sequence::builder().note("Cp", 0.3).rest(1.0).note("Fsm", 2.5).build();
        assert_eq!(sequence.to_notation(), "Cp(0.3) R(1) Fsm(2.5)");
        assert_eq!(Sequence::from_composition(&parse(&sequence.to_notation())), sequence);
    }

    #[test]
    fn builder_rest_advances_the_cursor() {
        let sequence = Sequence::builder().note("C", 0.25).rest(0.5).note("E", 1.0).build();
        assert_eq!(sequence.events()[2].start_offset_seconds, 0.75);
        assert_eq!(sequence.events()[1].note, "R");
    }

    #[test]
    fn event_lookup_by_offset() {
        let sequence = Sequence::builder().note("C", 1.0).note("D", 1.0).build();
        assert_eq!(sequence.event_at(1.5).map(|(i, _)| i), Some(1));
        assert_eq!(sequence.event_at(2.0), None);
    }

    #[test]
    fn bars_read_back_into_notes() {
        let layout = BarLayout::full(&parse("C(1) Xx(0.5) D(0.5)"), &LayoutConfig::default());
        let sequence = Sequence::from_bars(&layout);
        let names: Vec<&str> = sequence.events().iter().map(|e| e.note.as_str()).collect();
        assert_eq!(names, vec!["C", "D"]);
        assert_eq!(sequence.events()[1].start_offset_seconds, 1.0);
        assert_eq!(sequence.events()[1].duration_seconds, 0.5);
    }

    #[test]
    fn palette_skips_rests_without_advancing() {
        let colors = [
            Rgb::from_u32(0xee3c5c), // C
            Rgb::WHITE,              // rest
            Rgb::from_u32(0x2da8e6), // G
        ];
        let sequence = Sequence::from_palette(&colors, PALETTE_NOTE_SECONDS);
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.events()[1].note, "G");
        assert!((sequence.events()[1].start_offset_seconds - 0.3).abs() < 1e-12);
    }
}
