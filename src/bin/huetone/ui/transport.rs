//! Transport bar widget - play state, instrument, position and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use huetone::Instrument;

/// Peak and RMS of the scope window
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub struct TransportState {
    pub playing: bool,
    pub instrument: Instrument,
    pub elapsed: f64,
    pub total: f64,
    pub voices: usize,
    pub notes_started: usize,
    pub notes_total: usize,
}

pub fn render_transport(frame: &mut Frame, area: Rect, state: &TransportState, stats: &AudioStats) {
    let block = Block::default().title(" huetone ").borders(Borders::ALL);

    let (symbol, label, color) = if state.playing {
        ("▶", "Playing", Color::Green)
    } else {
        ("■", "Stopped", Color::Yellow)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {symbol} {label}  "), Style::default().fg(color)),
        Span::styled(
            format!("{}  ", state.instrument),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:5.1}s / {:.1}s  ", state.elapsed.min(state.total), state.total),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("notes {}/{}  voices {}  ", state.notes_started, state.notes_total, state.voices),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
