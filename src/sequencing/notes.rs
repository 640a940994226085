/*
Note Catalog
============

Every playable note has exactly one color and one frequency. The catalog is
a constant table: nothing adds to it, nothing mutates it.

Naming Convention:
- Pitch letter A-G, optional flat `b` (or sharp `s`, only in `Fs`)
- Octave marker suffix:

    suffix   octave   example   frequency
    ------   ------   -------   ---------
    mm       2        Cmm       65.41 Hz
    m        3        Cm        130.81 Hz
    (none)   4        C         261.63 Hz   (middle C)
    p        5        Cp        523.25 Hz

- `R` is the rest: 0 Hz, painted neutral gray.

Colors darken toward the low octaves and wash out toward the high ones, so
the same pitch class keeps its hue across octaves:

    Cmm #991732  →  Cm #c41e40  →  C #ee3c5c  →  Cp #ff7070

Lookups by name are case-insensitive (`dbp`, `DBP` and `Dbp` are the same
note). Catalog order matters: nearest-color ties go to the earlier entry,
and the rest comes first.
*/

use std::fmt;

use crate::color::Rgb;
use crate::error::UnmappedNote;

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteColorEntry {
    pub name: &'static str,
    pub color: Rgb,
    pub frequency_hz: f32,
}

const fn entry(name: &'static str, color: u32, frequency_hz: f32) -> NoteColorEntry {
    NoteColorEntry {
        name,
        color: Rgb::from_u32(color),
        frequency_hz,
    }
}

/// The fixed note → color/frequency table, in definition order.
pub const CATALOG: [NoteColorEntry; 49] = [
    entry("R", 0xf2f2f2, 0.0),
    // Octave 2
    entry("Cmm", 0x991732, 65.41),
    entry("Dbmm", 0xbf4426, 69.3),
    entry("Dmm", 0xbf8f28, 73.42),
    entry("Ebmm", 0xa6a022, 77.78),
    entry("Emm", 0x9aad29, 82.41),
    entry("Fmm", 0x5f9933, 87.31),
    entry("Fsmm", 0x4c997f, 92.5),
    entry("Gmm", 0x207099, 98.0),
    entry("Abmm", 0x3023a3, 103.83),
    entry("Amm", 0x6b1da3, 110.0),
    entry("Bbmm", 0xa31da3, 116.54),
    entry("Bmm", 0xbf2e72, 123.47),
    // Octave 3
    entry("Cm", 0xc41e40, 130.81),
    entry("Dbm", 0xe6512f, 138.59),
    entry("Dm", 0xe6ad31, 146.83),
    entry("Ebm", 0xd0ca2b, 155.56),
    entry("Em", 0xb6cc31, 164.81),
    entry("Fm", 0x6fb33c, 174.61),
    entry("Fsm", 0x59b394, 185.0),
    entry("Gm", 0x2683b3, 196.0),
    entry("Abm", 0x3c2bcc, 207.65),
    entry("Am", 0x8821cc, 220.0),
    entry("Bbm", 0xcc21cc, 233.08),
    entry("Bm", 0xe63a8a, 246.94),
    // Octave 4 (middle C octave)
    entry("C", 0xee3c5c, 261.63),
    entry("Db", 0xff6e4d, 277.18),
    entry("D", 0xfbc900, 293.66),
    entry("Eb", 0xe0d92c, 311.13),
    entry("E", 0xcee637, 329.63),
    entry("F", 0x86cc51, 349.23),
    entry("Fs", 0x6ddeb8, 369.99),
    entry("G", 0x2da8e6, 392.0),
    entry("Ab", 0x7c6ef5, 415.3),
    entry("A", 0xb347f5, 440.0), // A440 tuning reference
    entry("Bb", 0xf030f0, 466.16),
    entry("B", 0xf078b0, 493.88),
    // Octave 5
    entry("Cp", 0xff7070, 523.25),
    entry("Dbp", 0xff9780, 554.37),
    entry("Dp", 0xffe16b, 587.33),
    entry("Ebp", 0xf5ed30, 622.25),
    entry("Ep", 0xe3f562, 659.25),
    entry("Fp", 0xaee388, 698.46),
    entry("Fsp", 0x90f0cf, 739.99),
    entry("Gp", 0x79c9f2, 783.99),
    entry("Abp", 0x988cff, 830.61),
    entry("Ap", 0xd699ff, 880.0),
    entry("Bbp", 0xff80ff, 932.33),
    entry("Bp", 0xff99c9, 987.77),
];

/// A handle to one catalog entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note(u8);

impl Note {
    pub const REST: Note = Note(0);

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Note> {
        CATALOG
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
            .map(|index| Note(index as u8))
    }

    pub fn all() -> impl Iterator<Item = Note> {
        (0..CATALOG.len()).map(|index| Note(index as u8))
    }

    pub fn entry(self) -> &'static NoteColorEntry {
        &CATALOG[self.0 as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn color(self) -> Rgb {
        self.entry().color
    }

    pub fn frequency(self) -> f32 {
        self.entry().frequency_hz
    }

    pub fn is_rest(self) -> bool {
        self == Note::REST
    }

    /// Position in the catalog (rest = 0).
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Exact color match, as when reading a rendered bar back into a note.
    pub fn from_color(color: Rgb) -> Option<Note> {
        Note::all().find(|note| note.color() == color)
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Note({})", self.name())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn color_of(name: &str) -> Result<Rgb, UnmappedNote> {
    Note::from_name(name)
        .map(Note::color)
        .ok_or_else(|| UnmappedNote(name.to_string()))
}

pub fn frequency_of(name: &str) -> Result<f32, UnmappedNote> {
    Note::from_name(name)
        .map(Note::frequency)
        .ok_or_else(|| UnmappedNote(name.to_string()))
}
