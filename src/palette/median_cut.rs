/*
Median Cut
==========

Partition RGB space by repeatedly splitting the pixel set at the median of
its widest channel:

    depth 0          depth 1               depth 2
    [ all pixels ]   [ low R | high R ]    [ lo G | hi G | lo B | hi B ]

Depth is floor(log2(k)), so the palette has exactly 2^depth colors.

Everything happens in one owned buffer. A node is an index range; sorting
a range in place by its widest channel and halving the range replaces
slicing the array into copies.

Degenerate ranges: a range of zero or one pixel is never split. Its color
(or, for the empty range reachable only from an empty image, nothing) is
replicated across all leaves below it so the output length stays exact.
*/

use std::ops::Range;

use crate::color::Rgb;
use crate::palette::Pixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    R,
    G,
    B,
}

impl Channel {
    fn of(self, pixel: &Pixel) -> u8 {
        match self {
            Channel::R => pixel.r,
            Channel::G => pixel.g,
            Channel::B => pixel.b,
        }
    }
}

/// Tree depth for a requested palette size.
pub fn depth_for(k: usize) -> u32 {
    if k == 0 {
        0
    } else {
        k.ilog2()
    }
}

/// Median-cut palette with exactly `2^floor(log2(k))` colors for any
/// non-empty input.
pub fn median_cut(pixels: &[Pixel], k: usize) -> Vec<Rgb> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let depth = depth_for(k);
    let mut buffer = pixels.to_vec();
    let mut colors = Vec::with_capacity(1 << depth);
    split(&mut buffer, 0..pixels.len(), depth, &mut colors);
    colors
}

fn split(buffer: &mut [Pixel], range: Range<usize>, depth: u32, out: &mut Vec<Rgb>) {
    if depth == 0 || range.len() <= 1 {
        if let Some(color) = average(&buffer[range]) {
            out.extend(std::iter::repeat(color).take(1 << depth));
        }
        return;
    }

    let slice = &mut buffer[range.clone()];
    let channel = widest_channel(slice);
    slice.sort_by_key(|p| channel.of(p));

    let middle = range.start + range.len() / 2;
    split(buffer, range.start..middle, depth - 1, out);
    split(buffer, middle..range.end, depth - 1, out);
}

/// Channel with the largest max-min range. Ties prefer R, then G.
fn widest_channel(pixels: &[Pixel]) -> Channel {
    let spread = |channel: Channel| {
        let (lo, hi) = pixels.iter().fold((u8::MAX, u8::MIN), |(lo, hi), p| {
            let v = channel.of(p);
            (lo.min(v), hi.max(v))
        });
        hi.saturating_sub(lo)
    };

    let (r, g, b) = (spread(Channel::R), spread(Channel::G), spread(Channel::B));
    if r >= g && r >= b {
        Channel::R
    } else if g >= b {
        Channel::G
    } else {
        Channel::B
    }
}

fn average(pixels: &[Pixel]) -> Option<Rgb> {
    if pixels.is_empty() {
        return None;
    }
    let n = pixels.len() as f64;
    let (r, g, b) = pixels.iter().fold((0u64, 0u64, 0u64), |(r, g, b), p| {
        (r + p.r as u64, g + p.g as u64, b + p.b as u64)
    });
    Some(Rgb::from_f64(r as f64 / n, g as f64 / n, b as f64 / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_is_floor_log2() {
        assert_eq!(depth_for(1), 0);
        assert_eq!(depth_for(2), 1);
        assert_eq!(depth_for(3), 1);
        assert_eq!(depth_for(8), 3);
        assert_eq!(depth_for(9), 3);
    }

    #[test]
    fn output_length_is_a_power_of_two() {
        let pixels: Vec<Rgb> = (0..100u8).map(|v| Rgb::new(v, 255 - v, v / 2)).collect();
        for k in 1..=17 {
            assert_eq!(median_cut(&pixels, k).len(), 1 << depth_for(k), "k = {k}");
        }
    }

    #[test]
    fn tiny_images_still_fill_every_leaf() {
        let one = [Rgb::new(10, 20, 30)];
        assert_eq!(median_cut(&one, 8), vec![Rgb::new(10, 20, 30); 8]);

        let three = [Rgb::new(0, 0, 0), Rgb::new(100, 0, 0), Rgb::new(200, 0, 0)];
        assert_eq!(median_cut(&three, 8).len(), 8);
    }

    #[test]
    fn splits_on_the_widest_channel() {
        // Blue spans the full range, red and green barely move.
        let pixels = [
            Rgb::new(10, 10, 0),
            Rgb::new(12, 11, 250),
            Rgb::new(11, 10, 5),
            Rgb::new(10, 12, 255),
        ];
        let palette = median_cut(&pixels, 2);
        assert!(palette[0].b < 10);
        assert!(palette[1].b > 240);
    }

    #[test]
    fn single_leaf_is_the_rounded_mean() {
        let pixels = [Rgb::new(0, 10, 255), Rgb::new(1, 20, 255)];
        assert_eq!(median_cut(&pixels, 1), vec![Rgb::new(1, 15, 255)]);
    }

    #[test]
    fn input_is_not_reordered() {
        let pixels = vec![Rgb::new(200, 0, 0), Rgb::new(0, 0, 0)];
        let before = pixels.clone();
        median_cut(&pixels, 2);
        assert_eq!(pixels, before);
    }
}
