use std::collections::HashMap;

use crate::color::Rgb;
use crate::palette::Pixel;

/// Only every Nth pixel is counted; photos are large and neighbours agree.
pub const SAMPLE_STRIDE: usize = 4;

/// The `k` most frequent exact colors among every [`SAMPLE_STRIDE`]th pixel.
///
/// Ties keep first-seen order. Returns fewer than `k` colors when the sample
/// has fewer distinct colors.
pub fn dominant_colors(pixels: &[Pixel], k: usize) -> Vec<Rgb> {
    // color -> slot in `counts`, which preserves first-seen order
    let mut slots: HashMap<Rgb, usize> = HashMap::new();
    let mut counts: Vec<(Rgb, usize)> = Vec::new();

    for &pixel in pixels.iter().step_by(SAMPLE_STRIDE) {
        match slots.get(&pixel) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(pixel, counts.len());
                counts.push((pixel, 1));
            }
        }
    }

    // Stable sort: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(k).map(|(color, _)| color).collect()
}
