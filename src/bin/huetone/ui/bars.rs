//! Bar rows widget - one colored cell run per note, sized by duration

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use huetone::color::Rgb;
use huetone::layout::{Bar, BarLayout};

/// Layout pixels per terminal cell (8 cells per second at full scale)
const PIXELS_PER_CELL: f64 = 18.0;

fn cells_for(bar: &Bar) -> usize {
    ((bar.width as f64 / PIXELS_PER_CELL).round() as usize).max(1)
}

/// Dark text on light notes, light text on dark ones.
fn text_color(color: Rgb) -> Color {
    let luma = 0.299 * color.r as f32 + 0.587 * color.g as f32 + 0.114 * color.b as f32;
    if luma > 140.0 {
        Color::Black
    } else {
        Color::White
    }
}

fn fit(label: &str, cells: usize) -> String {
    let mut text: String = label.chars().take(cells).collect();
    let len = text.chars().count();
    text.extend(std::iter::repeat(' ').take(cells - len));
    text
}

/// Render every row of `layout`. Bars are numbered across rows in playback
/// order; `sounding` and `selected` refer to that numbering.
pub fn render_bars(
    frame: &mut Frame,
    area: Rect,
    layout: &BarLayout,
    sounding: Option<usize>,
    selected: usize,
) {
    if area.height == 0 || area.width < 4 {
        return;
    }

    let mut index = 0;
    let mut lines = Vec::with_capacity(layout.rows.len());

    for row in &layout.rows {
        let mut spans = Vec::with_capacity(row.bars.len());
        for bar in &row.bars {
            let mut style = Style::default()
                .bg(Color::Rgb(bar.color.r, bar.color.g, bar.color.b))
                .fg(text_color(bar.color));
            if sounding == Some(index) {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            if selected == index {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            spans.push(Span::styled(fit(&bar.label, cells_for(bar)), style));
            index += 1;
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
