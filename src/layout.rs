//! Bar layout: every token becomes a colored bar whose width is its duration
//! times a fixed pixel scale.
//!
//! Two renderings exist. The full view labels each bar and uses 144 px per
//! second; the compact view is unlabeled at 48 px per second and is what
//! gets exported. Widths are floored to whole pixels, and x offsets
//! accumulate left to right within a row.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::sequencing::notation::{Composition, NoteToken};

/// Bar height in pixels.
pub const ROW_HEIGHT: u32 = 48;
/// Vertical distance between row tops (bar height plus margin).
pub const ROW_PITCH: u32 = 60;
pub const DEFAULT_PADDING: u32 = 20;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarScale {
    Full,
    Compact,
}

impl BarScale {
    pub fn pixels_per_second(self) -> f64 {
        match self {
            BarScale::Full => 144.0,
            BarScale::Compact => 48.0,
        }
    }

    pub fn width_of(self, seconds: f64) -> u32 {
        (seconds * self.pixels_per_second()).floor().max(0.0) as u32
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    pub padding: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
        }
    }
}

impl LayoutConfig {
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Note name as written in the notation.
    pub note: String,
    /// Catalog color; white when the name is unmapped.
    pub color: Rgb,
    /// Offset from the start of the row, padding excluded.
    pub x: u32,
    pub width: u32,
    /// `Name(duration)` text shown on full-scale bars.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarRow {
    pub bars: Vec<Bar>,
}

impl BarRow {
    pub fn width(&self) -> u32 {
        self.bars.iter().map(|b| b.width).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub scale: BarScale,
    pub padding: u32,
    pub rows: Vec<BarRow>,
}

impl BarLayout {
    pub fn new(composition: &Composition, scale: BarScale, config: &LayoutConfig) -> Self {
        let rows = composition
            .lines
            .iter()
            .map(|line| layout_row(line, scale))
            .collect();

        Self {
            scale,
            padding: config.padding,
            rows,
        }
    }

    pub fn full(composition: &Composition, config: &LayoutConfig) -> Self {
        Self::new(composition, BarScale::Full, config)
    }

    pub fn compact(composition: &Composition, config: &LayoutConfig) -> Self {
        Self::new(composition, BarScale::Compact, config)
    }

    /// Widest row, padding excluded.
    pub fn content_width(&self) -> u32 {
        self.rows.iter().map(BarRow::width).max().unwrap_or(0)
    }

    pub fn total_width(&self) -> u32 {
        self.content_width() + 2 * self.padding
    }

    pub fn total_height(&self) -> u32 {
        self.rows.len() as u32 * ROW_PITCH + 2 * self.padding
    }

    /// Top edge of a row in the padded canvas.
    pub fn row_y(&self, row: usize) -> u32 {
        row as u32 * ROW_PITCH + self.padding
    }
}

fn layout_row(line: &[NoteToken], scale: BarScale) -> BarRow {
    let mut x = 0;
    let bars = line
        .iter()
        .map(|token| {
            let width = scale.width_of(token.duration_seconds);
            let bar = Bar {
                note: token.name.clone(),
                color: token.note().map_or(Rgb::WHITE, |n| n.color()),
                x,
                width,
                label: format!("{}({})", token.name, token.duration_seconds),
            };
            x += width;
            bar
        })
        .collect();

    BarRow { bars }
}
