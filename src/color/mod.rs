//! RGB colors, hex conversion and the nearest-note bridge.
//!
//! Colors travel through the crate as [`Rgb`] and only become `#rrggbb`
//! strings at the edges (palette output, SVG export, CLI printing).

/// Resolve arbitrary colors to the closest catalog note.
pub mod nearest;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Round floating channel values (e.g. a cluster mean) to the nearest byte.
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Parse `#rrggbb` (leading `#` optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadHex(hex.to_string()));
        }

        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::BadHex(hex.to_string()))?;
        Ok(Self::from_u32(value))
    }

    /// Parse either hex or a CSS `rgb(r, g, b)` / `rgba(r, g, b, a)` string,
    /// the two forms a rendered bar's background color can come back as.
    pub fn from_css(css: &str) -> Result<Self, ColorParseError> {
        let compact: String = css
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        if !compact.starts_with("rgb") {
            return Self::from_hex(&compact);
        }

        let channels: Vec<u8> = compact
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .take(3)
            .map(|part| part.parse::<u16>().map(|v| v.min(255) as u8))
            .collect::<Result<_, _>>()
            .map_err(|_| ColorParseError::Unrecognized(css.to_string()))?;

        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(ColorParseError::Unrecognized(css.to_string())),
        }
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Squared Euclidean distance in RGB space. Ordering is identical to the
    /// true distance, so comparisons never need the square root.
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    pub fn distance(self, other: Rgb) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_css(s)
    }
}
