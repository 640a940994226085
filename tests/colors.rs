use huetone::color::nearest::{nearest_note, nearest_note_rgb};
use huetone::palette::{extract_palette, extract_palette_or_empty, quantize, Algorithm};
use huetone::sequencing::{color_of, frequency_of, CATALOG};
use huetone::{Note, Rgb, Sequence};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn solid_blocks(colors: &[Rgb], block: usize) -> Vec<Rgb> {
    colors.iter().flat_map(|&c| std::iter::repeat(c).take(block)).collect()
}

#[test]
fn every_catalog_note_resolves_back_to_itself() {
    for entry in CATALOG.iter() {
        let color = color_of(entry.name).unwrap();
        assert_eq!(nearest_note(&color.to_hex()).unwrap().name(), entry.name);
    }
}

#[test]
fn catalog_colors_and_frequencies_share_one_key_set() {
    for entry in CATALOG.iter() {
        assert!(color_of(entry.name).is_ok());
        assert!(frequency_of(entry.name).is_ok());
    }
    assert_eq!(color_of("R").unwrap().to_hex(), "#f2f2f2");
    assert_eq!(frequency_of("R").unwrap(), 0.0);
}

#[test]
fn random_colors_resolve_to_a_closest_note() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let probe = Rgb::new(rng.gen(), rng.gen(), rng.gen());
        let chosen = nearest_note_rgb(probe);
        let best = Note::all()
            .map(|n| probe.distance_squared(n.color()))
            .min()
            .unwrap();
        assert_eq!(probe.distance_squared(chosen.color()), best);
    }
}

#[test]
fn dominant_respects_both_limits() {
    let mut rng = StdRng::seed_from_u64(1);
    let three = [Rgb::new(10, 0, 0), Rgb::new(0, 10, 0), Rgb::new(0, 0, 10)];
    let pixels = solid_blocks(&three, 40);

    for k in 1..6 {
        let palette = quantize(&pixels, k, Algorithm::Dominant, &mut rng).unwrap();
        assert!(palette.len() <= k);
        assert!(palette.len() <= three.len());
    }
}

#[test]
fn median_cut_returns_a_power_of_two() {
    let mut rng = StdRng::seed_from_u64(2);
    let pixels: Vec<Rgb> = (0..300)
        .map(|_| Rgb::new(rng.gen(), rng.gen(), rng.gen()))
        .collect();

    for (k, expected) in [(1, 1), (2, 2), (3, 2), (5, 4), (8, 8), (12, 8), (16, 16)] {
        let palette = quantize(&pixels, k, Algorithm::MedianCut, &mut rng).unwrap();
        assert_eq!(palette.len(), expected, "k = {k}");
    }

    // Even a single pixel fills every leaf.
    let palette = quantize(&[Rgb::new(1, 2, 3)], 8, Algorithm::MedianCut, &mut rng).unwrap();
    assert_eq!(palette.len(), 8);
}

#[test]
fn kmeans_finds_separated_blocks() {
    let blocks = [Rgb::new(250, 0, 0), Rgb::new(0, 250, 0), Rgb::new(0, 0, 250)];
    let pixels = solid_blocks(&blocks, 64);

    let mut recovered = 0;
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut colors = quantize(&pixels, 3, Algorithm::KMeans, &mut rng).unwrap().colors;
        colors.sort_by_key(|c| (c.r, c.g, c.b));
        let mut expected = blocks.to_vec();
        expected.sort_by_key(|c| (c.r, c.g, c.b));
        if colors == expected {
            recovered += 1;
        }
    }
    // Random seeding can pick two seeds in one block; most trials must not.
    assert!(recovered >= 10, "recovered in only {recovered}/20 trials");
}

#[test]
fn rgba_buffers_flow_through_to_notes() {
    let c = color_of("C").unwrap();
    let g = color_of("G").unwrap();
    let rgba: Vec<u8> = solid_blocks(&[c, g], 32)
        .iter()
        .flat_map(|p| [p.r, p.g, p.b, 128])
        .collect();

    let mut rng = StdRng::seed_from_u64(4);
    let palette = extract_palette(&rgba, 2, Algorithm::Dominant, &mut rng).unwrap();
    let sequence = Sequence::from_palette(&palette.colors, 0.3);
    let names: Vec<&str> = sequence.events().iter().map(|e| e.note.as_str()).collect();
    assert_eq!(names, vec!["C", "G"]);
}

#[test]
fn unusable_input_gives_an_empty_palette_at_the_boundary() {
    assert!(extract_palette_or_empty(&[], 4, Algorithm::KMeans).is_empty());
    assert!(extract_palette_or_empty(&[1, 2, 3, 4], 0, Algorithm::Dominant).is_empty());
}
