//! Terminal UI: the piano render surface, input translation, and a small
//! oscilloscope fed from the audio thread.

mod piano;
mod scope;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use keybed::dsp::oscillator::Waveform;
use keybed::input::{InputDispatcher, NoteSink, PhysicalKey};
use keybed::layout::KeyDescriptor;
use keybed::synth::EngineMessage;

use super::config::Settings;
use piano::PianoGeometry;

/// Audio visualization buffer size.
const VIS_BUFFER_SIZE: usize = 1024;
/// Volume change per -/+ keypress.
const VOLUME_STEP: f32 = 0.05;
/// Simulated hold time for terminals without key release events.
const TAP_HOLD: Duration = Duration::from_millis(200);

/// Pushes note events onto the control ring for the audio thread.
struct ChannelSink {
    tx: Producer<EngineMessage>,
}

impl ChannelSink {
    fn send(&mut self, msg: EngineMessage) {
        if self.tx.push(msg).is_err() {
            log::debug!("control queue full, dropping {msg:?}");
        }
    }
}

impl NoteSink for ChannelSink {
    fn press(&mut self, key: &KeyDescriptor) {
        self.send(EngineMessage::Press {
            note: key.midi_note,
            frequency: key.frequency_hz,
        });
    }

    fn release(&mut self, key: &KeyDescriptor) {
        self.send(EngineMessage::Release {
            note: key.midi_note,
        });
    }
}

pub struct UiApp {
    keys: Vec<KeyDescriptor>,
    dispatcher: InputDispatcher,
    sink: ChannelSink,
    tap_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    waveform: Waveform,
    volume: f32,
    /// Whether the terminal reports key release events.
    supports_release: bool,
    /// Pending simulated releases when it does not.
    tap_queue: Vec<(Instant, PhysicalKey)>,
    /// Key the mouse button went down on, if still held.
    pointer_at: Option<usize>,
    /// Cell-space mapping of the last rendered piano, for hit testing.
    geometry: Option<PianoGeometry>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        keys: Vec<KeyDescriptor>,
        settings: &Settings,
        msg_tx: Producer<EngineMessage>,
        tap_rx: Consumer<f32>,
        supports_release: bool,
    ) -> Self {
        let dispatcher = InputDispatcher::new(&keys);
        Self {
            keys,
            dispatcher,
            sink: ChannelSink { tx: msg_tx },
            tap_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            waveform: settings.waveform.into(),
            volume: settings.volume,
            supports_release,
            tap_queue: Vec::new(),
            pointer_at: None,
            geometry: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.expire_taps();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking input, ~60fps.
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        // Cut every tail on the way out.
        self.sink.send(EngineMessage::AllNotesOff);
        Ok(())
    }

    /// Drain the audio tap, keeping the most recent window.
    fn poll_audio(&mut self) {
        let mut new_samples = Vec::new();
        while let Ok(sample) = self.tap_rx.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press => self.handle_key_press(key.code),
            KeyEventKind::Release => {
                if let Some(pk) = decode_key(key.code) {
                    self.dispatcher
                        .physical_key_up(&self.keys, pk, &mut self.sink);
                }
            }
            // Dispatcher guards repeats anyway; don't even forward them.
            KeyEventKind::Repeat => {}
        }
    }

    fn handle_key_press(&mut self, code: KeyCode) {
        match code {
            // 'q' is not in the binding table, so it is free to quit on.
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => {
                self.waveform = self.waveform.cycled();
                self.sink.send(EngineMessage::SetWaveform(self.waveform));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_volume(VOLUME_STEP),
            KeyCode::Char('-') => self.adjust_volume(-VOLUME_STEP),
            code => {
                let Some(pk) = decode_key(code) else { return };
                if self.supports_release {
                    self.dispatcher
                        .physical_key_down(&self.keys, pk, &mut self.sink);
                } else {
                    self.tap(pk);
                }
            }
        }
    }

    /// Fallback for terminals without key release events: notes become
    /// short taps and space toggles the sustain latch instead of holding.
    fn tap(&mut self, pk: PhysicalKey) {
        match pk {
            PhysicalKey::Sustain => {
                if self.dispatcher.sustain_active() {
                    self.dispatcher
                        .physical_key_up(&self.keys, pk, &mut self.sink);
                } else {
                    self.dispatcher
                        .physical_key_down(&self.keys, pk, &mut self.sink);
                }
            }
            PhysicalKey::Char(_) => {
                self.dispatcher
                    .physical_key_down(&self.keys, pk, &mut self.sink);
                self.tap_queue.push((Instant::now() + TAP_HOLD, pk));
            }
        }
    }

    fn expire_taps(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.tap_queue.len() {
            if self.tap_queue[i].0 <= now {
                let (_, pk) = self.tap_queue.swap_remove(i);
                self.dispatcher
                    .physical_key_up(&self.keys, pk, &mut self.sink);
            } else {
                i += 1;
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = self
            .geometry
            .as_ref()
            .and_then(|g| g.hit(&self.keys, mouse.column, mouse.row));

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(position) = hit {
                    self.dispatcher
                        .pointer_down(&self.keys, position, &mut self.sink);
                    self.pointer_at = Some(position);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                // Dragging off the pressed key counts as leaving it.
                if let Some(position) = self.pointer_at {
                    if hit != Some(position) {
                        self.dispatcher
                            .pointer_leave(&self.keys, position, &mut self.sink);
                        self.pointer_at = None;
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(position) = self.pointer_at.take() {
                    self.dispatcher
                        .pointer_up(&self.keys, position, &mut self.sink);
                }
            }
            _ => {}
        }
    }

    fn adjust_volume(&mut self, delta: f32) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.sink.send(EngineMessage::SetVolume(self.volume));
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Piano surface
                Constraint::Length(8), // Oscilloscope
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.render_status(frame, chunks[0]);

        self.geometry = Some(piano::render_piano(
            frame,
            chunks[1],
            &self.keys,
            &self.dispatcher,
        ));

        scope::render_scope(frame, chunks[2], &self.audio_buffer);

        let help = Paragraph::new(
            " [Q] Quit  [Tab] Waveform  [-/+] Volume  [Space] Sustain  Keys/mouse play notes",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" keybed ").borders(Borders::ALL);

        let range = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => format!("MIDI {}-{}  ", first.midi_note, last.midi_note),
            _ => String::from("empty layout  "),
        };

        let mut spans = vec![
            Span::styled(
                format!(" {}  ", self.waveform.name()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("vol {:.2}  ", self.volume),
                Style::default().fg(Color::White),
            ),
            Span::styled(range, Style::default().fg(Color::DarkGray)),
            if self.dispatcher.sustain_active() {
                Span::styled("SUSTAIN", Style::default().fg(Color::Green))
            } else {
                Span::styled("sustain off", Style::default().fg(Color::DarkGray))
            },
        ];

        if !self.supports_release {
            spans.push(Span::styled(
                "  (tap mode: no key-release events)",
                Style::default().fg(Color::Yellow),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}

/// Decode a raw key code. Space is matched by code before the character
/// table is consulted, so sustain never collides with a note binding.
fn decode_key(code: KeyCode) -> Option<PhysicalKey> {
    match code {
        KeyCode::Char(' ') => Some(PhysicalKey::Sustain),
        KeyCode::Char(c) => Some(PhysicalKey::Char(c.to_ascii_lowercase())),
        _ => None,
    }
}
