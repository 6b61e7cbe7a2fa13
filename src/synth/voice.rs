//! A single sounding voice: one oscillator shaped by one envelope.

use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::{Oscillator, Waveform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, tail still sounding
}

/// Voice parameters are captured at start time. Changing the engine's
/// waveform or volume afterwards never touches a voice that is already
/// sounding.
pub struct Voice {
    note: i32,
    frequency: f32,
    volume: f32,
    age: u64,
    state: VoiceState,
    sample_rate: f32,
    osc: Oscillator,
    env: Envelope,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            note: 0,
            frequency: 0.0,
            volume: 0.0,
            age: 0,
            state: VoiceState::Free,
            sample_rate,
            osc: Oscillator::new(Waveform::Sine),
            env: Envelope::new(),
        }
    }

    /// Begin sounding. Resets the oscillator phase and retriggers the
    /// envelope from zero.
    pub fn start(&mut self, note: i32, frequency: f32, waveform: Waveform, volume: f32, age: u64) {
        self.note = note;
        self.frequency = frequency;
        self.volume = volume;
        self.age = age;
        self.state = VoiceState::Active;
        self.osc = Oscillator::new(waveform);
        self.env.note_on();
    }

    /// Begin the release tail. The voice keeps rendering until the envelope
    /// goes idle, then frees itself.
    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.env.note_off(self.sample_rate);
        }
    }

    /// Render this voice additively into `out`.
    pub fn render_into(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            self.env.next_sample(self.sample_rate);
            *sample +=
                self.osc.next_sample(self.frequency, self.sample_rate) * self.env.level() * self.volume;
        }

        if self.state == VoiceState::Releasing && !self.env.is_active() {
            self.free();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_sounding(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = 0;
        self.volume = 0.0;
    }

    pub fn note(&self) -> i32 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }
}
