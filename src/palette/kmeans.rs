use rand::Rng;

use crate::color::Rgb;
use crate::palette::Pixel;

/// Fixed pass budget. There is no convergence check; cost stays bounded for
/// interactive use.
pub const ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, pixel: Pixel) {
        self.r += pixel.r as u64;
        self.g += pixel.g as u64;
        self.b += pixel.b as u64;
        self.count += 1;
    }

    fn mean(&self) -> Option<[f64; 3]> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some([self.r as f64 / n, self.g as f64 / n, self.b as f64 / n])
    }
}

fn distance_squared(pixel: Pixel, centroid: &[f64; 3]) -> f64 {
    let dr = pixel.r as f64 - centroid[0];
    let dg = pixel.g as f64 - centroid[1];
    let db = pixel.b as f64 - centroid[2];
    dr * dr + dg * dg + db * db
}

fn nearest_centroid(pixel: Pixel, centroids: &[[f64; 3]]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = distance_squared(pixel, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

/// Lloyd's algorithm in RGB space, seeded with `k` random pixels (duplicates
/// allowed). An empty cluster keeps its previous centroid.
///
/// `pixels` must be non-empty; [`crate::palette::quantize`] checks this.
pub fn kmeans<R: Rng + ?Sized>(pixels: &[Pixel], k: usize, rng: &mut R) -> Vec<Rgb> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<[f64; 3]> = (0..k)
        .map(|_| {
            let seed = pixels[rng.gen_range(0..pixels.len())];
            [seed.r as f64, seed.g as f64, seed.b as f64]
        })
        .collect();

    let mut sums = vec![Accumulator::default(); k];
    for _ in 0..ITERATIONS {
        sums.iter_mut().for_each(|acc| *acc = Accumulator::default());

        for &pixel in pixels {
            sums[nearest_centroid(pixel, &centroids)].add(pixel);
        }

        for (centroid, acc) in centroids.iter_mut().zip(&sums) {
            if let Some(mean) = acc.mean() {
                *centroid = mean;
            }
        }
    }

    centroids
        .into_iter()
        .map(|[r, g, b]| Rgb::from_f64(r, g, b))
        .collect()
}
