//! Voice engine: at most one live voice per key, released tails ring out on
//! their own.
//!
//! The engine is single-threaded by construction: it lives inside the audio
//! callback and is only ever driven from there. Other threads reach it
//! through [`EngineMessage`] values pushed over a ring buffer and drained by
//! [`VoiceEngine::pump`] at the top of each block.

use crate::dsp::oscillator::Waveform;
use crate::input::NoteSink;
use crate::layout::KeyDescriptor;
use crate::synth::message::{EngineMessage, MessageReceiver};
use crate::synth::voice::{Voice, VoiceState};
use crate::MAX_BLOCK_SIZE;

pub struct VoiceEngine {
    voices: Vec<Voice>,
    waveform: Waveform,
    volume: f32,
    temp_buffer: Vec<f32>,
    frame_counter: u64,
}

impl VoiceEngine {
    /// Preallocates `max_voices` voice slots; the render path never
    /// allocates.
    pub fn new(sample_rate: f32, max_voices: usize, waveform: Waveform, volume: f32) -> Self {
        let voices = (0..max_voices).map(|_| Voice::new(sample_rate)).collect();

        Self {
            voices,
            waveform,
            volume,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Applies to future presses only; sounding voices keep the waveform
    /// they were started with.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Applies to future presses only.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    /// Start a voice for `note` unless one is already live. Waveform and
    /// volume are read now, at press time.
    pub fn press(&mut self, note: i32, frequency: f32) {
        if self.find_live(note).is_some() {
            return;
        }

        let age = self.frame_counter;
        let (waveform, volume) = (self.waveform, self.volume);
        match self.allocate_voice() {
            Some(voice) => voice.start(note, frequency, waveform, volume, age),
            None => log::debug!("voice pool exhausted, dropping press for note {note}"),
        }
    }

    /// Move the live voice for `note` (if any) into its release tail. The
    /// voice leaves the engine's bookkeeping immediately: `has_voice`
    /// reports false from here on even though the tail is still audible.
    pub fn release(&mut self, note: i32) {
        if let Some(voice) = self.find_live(note) {
            voice.release();
        }
    }

    /// Release every live voice (quit path, panic button).
    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            if voice.state() == VoiceState::Active {
                voice.release();
            }
        }
    }

    /// Whether a live (pressed, not yet released) voice exists for `note`.
    pub fn has_voice(&self, note: i32) -> bool {
        self.voices
            .iter()
            .any(|v| v.note() == note && v.state() == VoiceState::Active)
    }

    /// Number of live voices.
    pub fn live_voices(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| v.state() == VoiceState::Active)
            .count()
    }

    /// Number of audible voices, release tails included.
    pub fn sounding_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_sounding()).count()
    }

    pub fn handle(&mut self, msg: EngineMessage) {
        match msg {
            EngineMessage::Press { note, frequency } => self.press(note, frequency),
            EngineMessage::Release { note } => self.release(note),
            EngineMessage::SetWaveform(waveform) => self.set_waveform(waveform),
            EngineMessage::SetVolume(volume) => self.set_volume(volume),
            EngineMessage::AllNotesOff => self.release_all(),
        }
    }

    /// Drain pending control messages. Called from the audio callback before
    /// rendering each block.
    pub fn pump(&mut self, rx: &mut impl MessageReceiver) {
        while let Some(msg) = rx.pop() {
            self.handle(msg);
        }
    }

    /// Mix every sounding voice into `out` (mono).
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_sounding() {
                let block = &mut self.temp_buffer[..out.len()];
                block.fill(0.0);
                voice.render_into(block);

                for (o, v) in out.iter_mut().zip(block.iter()) {
                    *o += v;
                }
            }
        }

        self.frame_counter += out.len() as u64;
    }

    fn find_live(&mut self, note: i32) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.note() == note && v.state() == VoiceState::Active)
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice> {
        // First pass: a free slot.
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        // Second pass: steal the oldest releasing tail.
        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx);

        if let Some(idx) = steal_idx {
            log::debug!("stealing releasing voice slot {idx}");
            return Some(&mut self.voices[idx]);
        }

        None
    }
}

/// The engine is itself a note sink, so the input dispatcher can drive it
/// directly in single-threaded setups and tests.
impl NoteSink for VoiceEngine {
    fn press(&mut self, key: &KeyDescriptor) {
        VoiceEngine::press(self, key.midi_note, key.frequency_hz);
    }

    fn release(&mut self, key: &KeyDescriptor) {
        VoiceEngine::release(self, key.midi_note);
    }
}
