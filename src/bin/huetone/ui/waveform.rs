//! Oscilloscope of the last rendered samples

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Chains are quiet (master gain 0.3); keep small signals visible.
const MIN_RANGE: f64 = 0.25;

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32]) {
    let block = Block::default().title(" Scope ").borders(Borders::ALL);

    let len = samples.len().max(1) as f64;
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / len, s as f64))
        .collect();

    let range = samples
        .iter()
        .fold(MIN_RANGE, |acc, &s| acc.max(s.abs() as f64))
        .min(1.0);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
