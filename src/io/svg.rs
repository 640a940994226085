//! SVG export of the compact bar layout.

use crate::layout::{BarLayout, ROW_HEIGHT};

pub const STROKE_COLOR: &str = "#353638";
pub const STROKE_WIDTH: f32 = 0.75;
pub const DEFAULT_FILE_NAME: &str = "music_notation";

/// Render a layout as a standalone SVG document: a white background and one
/// stroked `rect` per bar.
pub fn render_svg(layout: &BarLayout) -> String {
    let width = layout.total_width();
    let height = layout.total_height();

    let rects: String = layout
        .rows
        .iter()
        .enumerate()
        .flat_map(|(index, row)| {
            let y = layout.row_y(index);
            row.bars.iter().map(move |bar| {
                format!(
                    r#"<rect x="{x}" y="{y}" width="{w}" height="{ROW_HEIGHT}" fill="{fill}" stroke="{STROKE_COLOR}" stroke-width="{STROKE_WIDTH}"/>"#,
                    x = layout.padding + bar.x,
                    w = bar.width,
                    fill = bar.color,
                )
            })
        })
        .collect();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><rect x="0" y="0" width="{width}" height="{height}" fill="white"/>{rects}</svg>"#
    )
}

/// `title_artist`, lowercased, with everything outside `[a-z0-9]` turned
/// into `_`. Blank input falls back to `music_notation`.
pub fn export_file_name(title: &str, artist: &str) -> String {
    let (title, artist) = (title.trim(), artist.trim());
    if title.is_empty() && artist.is_empty() {
        return DEFAULT_FILE_NAME.to_string();
    }

    format!("{title}_{artist}")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
