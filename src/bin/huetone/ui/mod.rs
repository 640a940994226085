//! Terminal view for playback
//!
//! Shows the composition as colored bar rows, highlights the bar under the
//! playback clock, and draws the output as an oscilloscope.

mod bars;
mod transport;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use tracing::warn;

use huetone::engine::{lock, AudioEngine};
use huetone::layout::BarLayout;
use huetone::synth::{EventReceiver, PlaybackEvent};
use huetone::{Instrument, PlaybackStart, Sequence};

use super::app::CpalBackend;
use bars::render_bars;
use transport::{render_transport, AudioStats, TransportState};
use waveform::render_waveform;

/// Samples shown by the oscilloscope
const SCOPE_WINDOW: usize = 1024;

pub struct UiApp {
    engine: AudioEngine<CpalBackend>,
    sequence: Sequence,
    layout: BarLayout,
    events_rx: Consumer<PlaybackEvent>,
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    selected: usize,
    notes_started: usize,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        engine: AudioEngine<CpalBackend>,
        sequence: Sequence,
        layout: BarLayout,
        events_rx: Consumer<PlaybackEvent>,
        scope_rx: Consumer<f32>,
    ) -> Self {
        Self {
            engine,
            sequence,
            layout,
            events_rx,
            scope_rx,
            scope: vec![0.0; SCOPE_WINDOW],
            selected: 0,
            notes_started: 0,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.poll_events();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.engine.stop();
        Ok(())
    }

    fn poll_scope(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > SCOPE_WINDOW {
            let excess = self.scope.len() - SCOPE_WINDOW;
            self.scope.drain(0..excess);
        }
    }

    fn poll_events(&mut self) {
        while let Some(event) = EventReceiver::pop(&mut self.events_rx) {
            // Previews carry no event index and are not counted
            if let PlaybackEvent::NoteStarted { event_index: Some(_), .. } = event {
                self.notes_started += 1;
            }
        }
    }

    /// Index of the event under the playback clock.
    fn sounding(&self) -> Option<usize> {
        let elapsed = self.engine.elapsed()?;
        self.sequence.event_at(elapsed).map(|(index, _)| index)
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Char('i') => {
                let next = match self.engine.instrument() {
                    Instrument::Piano => Instrument::Guitar,
                    Instrument::Guitar => Instrument::Organ,
                    Instrument::Organ => Instrument::Piano,
                };
                self.engine.set_instrument(next);
            }
            KeyCode::Left => self.selected = self.selected.saturating_sub(1),
            KeyCode::Right => {
                self.selected = (self.selected + 1).min(self.sequence.len().saturating_sub(1));
            }
            KeyCode::Enter => self.preview_selected(),
            _ => {}
        }
    }

    fn toggle_playback(&mut self) {
        if self.engine.is_playing() {
            self.engine.stop();
            return;
        }
        match self.engine.play_sequence(&self.sequence) {
            Ok(PlaybackStart::Started(_)) => self.notes_started = 0,
            Ok(PlaybackStart::AlreadyPlaying) => {}
            Err(err) => warn!("playback failed: {err}"),
        }
    }

    fn preview_selected(&mut self) {
        let Some(note) = self.sequence.events().get(self.selected).and_then(|e| e.resolve()) else {
            return;
        };
        if let Err(err) = self.engine.preview_note(note) {
            warn!(%note, "preview failed: {err}");
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(6),    // Bars
                Constraint::Length(8), // Scope
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let voices = lock(&self.engine.timeline()).tracked_voices().len();
        let state = TransportState {
            playing: self.engine.is_playing(),
            instrument: self.engine.instrument(),
            elapsed: self.engine.elapsed().unwrap_or(0.0),
            total: self.sequence.total_seconds(),
            voices,
            notes_started: self.notes_started,
            notes_total: self.sequence.len(),
        };
        render_transport(frame, chunks[0], &state, &AudioStats::from_buffer(&self.scope));

        let bars_block = Block::default().title(" Melody ").borders(Borders::ALL);
        let bars_inner = bars_block.inner(chunks[1]);
        frame.render_widget(bars_block, chunks[1]);
        render_bars(frame, bars_inner, &self.layout, self.sounding(), self.selected);

        render_waveform(frame, chunks[2], &self.scope);

        let help = Paragraph::new(" [Q] Quit  [Space] Play/Stop  [I] Instrument  [←/→] Select  [Enter] Preview")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
