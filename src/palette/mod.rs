//! Palette extraction: reduce an image to a handful of representative colors.
//!
//! Three algorithms trade accuracy for cost:
//!
//! | algorithm    | idea                               | output length            |
//! | ------------ | ---------------------------------- | ------------------------ |
//! | `dominant`   | most frequent exact colors         | `<= k`                   |
//! | `kmeans`     | Lloyd's clustering, 10 fixed passes| `k`                      |
//! | `medianCut`  | recursive split on widest channel  | `2^floor(log2(k))`       |
//!
//! [`quantize`] reports failures explicitly; [`extract_palette_or_empty`] is
//! the never-fails boundary for UI callers that only want "colors or nothing".

/// Frequency-count extraction over a strided sample.
pub mod dominant;
/// Lloyd's k-means clustering in RGB space.
pub mod kmeans;
/// Median-cut space partitioning over one owned buffer.
pub mod median_cut;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::error::{ConfigError, QuantizeError};
use crate::io::rgba::pixels_from_rgba;

/// A single sampled pixel. Alpha is dropped when the buffer is decoded.
pub type Pixel = Rgb;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Dominant,
    #[cfg_attr(feature = "serde", serde(rename = "kmeans"))]
    KMeans,
    MedianCut,
}

impl Algorithm {
    /// Lenient selector: anything unrecognized means `Dominant`.
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or(Algorithm::Dominant)
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dominant" => Ok(Algorithm::Dominant),
            "kmeans" | "k-means" => Ok(Algorithm::KMeans),
            "mediancut" | "median-cut" => Ok(Algorithm::MedianCut),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Dominant => "dominant",
            Algorithm::KMeans => "kmeans",
            Algorithm::MedianCut => "medianCut",
        })
    }
}

/// Ordered representative colors. Empty means extraction failed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    pub colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.colors.iter()
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

/// Reduce `pixels` to at most `k` colors with the chosen algorithm.
///
/// `rng` only matters for k-means seeding; pass a seeded `StdRng` for
/// reproducible palettes.
pub fn quantize<R: Rng + ?Sized>(
    pixels: &[Pixel],
    k: usize,
    algorithm: Algorithm,
    rng: &mut R,
) -> Result<Palette, QuantizeError> {
    if k == 0 {
        return Err(QuantizeError::NoColorsRequested);
    }
    if pixels.is_empty() {
        return Err(QuantizeError::EmptyImage);
    }

    let colors = match algorithm {
        Algorithm::Dominant => dominant::dominant_colors(pixels, k),
        Algorithm::KMeans => kmeans::kmeans(pixels, k, rng),
        Algorithm::MedianCut => median_cut::median_cut(pixels, k),
    };

    debug!(%algorithm, k, pixels = pixels.len(), colors = colors.len(), "palette extracted");
    Ok(Palette::new(colors))
}

/// Decode a raw RGBA buffer and quantize it.
pub fn extract_palette<R: Rng + ?Sized>(
    rgba: &[u8],
    k: usize,
    algorithm: Algorithm,
    rng: &mut R,
) -> Result<Palette, QuantizeError> {
    let pixels = pixels_from_rgba(rgba);
    quantize(&pixels, k, algorithm, rng)
}

/// Like [`extract_palette`] but failure collapses to an empty palette.
pub fn extract_palette_or_empty(rgba: &[u8], k: usize, algorithm: Algorithm) -> Palette {
    match extract_palette(rgba, k, algorithm, &mut rand::thread_rng()) {
        Ok(palette) => palette,
        Err(err) => {
            warn!(%algorithm, k, "palette extraction failed: {err}");
            Palette::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rgba(pixels: &[Rgb]) -> Vec<u8> {
        pixels.iter().flat_map(|p| [p.r, p.g, p.b, 255]).collect()
    }

    #[test]
    fn selectors_parse_and_fall_back() {
        assert_eq!("kmeans".parse::<Algorithm>().unwrap(), Algorithm::KMeans);
        assert_eq!("medianCut".parse::<Algorithm>().unwrap(), Algorithm::MedianCut);
        assert!("octree".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::from_selector("octree"), Algorithm::Dominant);
        assert_eq!(Algorithm::MedianCut.to_string(), "medianCut");
    }

    #[test]
    fn zero_colors_is_rejected_with_reason() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = quantize(&[Rgb::WHITE], 0, Algorithm::KMeans, &mut rng);
        assert_eq!(result, Err(QuantizeError::NoColorsRequested));
    }

    #[test]
    fn empty_image_is_rejected_with_reason() {
        let mut rng = StdRng::seed_from_u64(1);
        for algorithm in [Algorithm::Dominant, Algorithm::KMeans, Algorithm::MedianCut] {
            assert_eq!(
                extract_palette(&[], 4, algorithm, &mut rng),
                Err(QuantizeError::EmptyImage)
            );
        }
    }

    #[test]
    fn boundary_turns_failure_into_empty_palette() {
        assert!(extract_palette_or_empty(&[], 4, Algorithm::MedianCut).is_empty());
    }

    #[test]
    fn boundary_passes_success_through() {
        let buffer = rgba(&[Rgb::new(1, 2, 3); 8]);
        let palette = extract_palette_or_empty(&buffer, 2, Algorithm::MedianCut);
        assert_eq!(palette.to_hex(), vec!["#010203", "#010203"]);
    }
}
