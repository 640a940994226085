use crate::palette::Pixel;

pub const BYTES_PER_PIXEL: usize = 4;

/// Decode a row-major RGBA buffer. Alpha is ignored, and a trailing partial
/// pixel is dropped.
pub fn pixels_from_rgba(buffer: &[u8]) -> Vec<Pixel> {
    buffer
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|px| Pixel::new(px[0], px[1], px[2]))
        .collect()
}
