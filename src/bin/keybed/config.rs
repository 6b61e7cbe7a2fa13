//! Settings layer: CLI flags for key count, start note, waveform, volume.
//!
//! Clamping happens here, before anything downstream sees the values. The
//! layout engine and voice engine trust their inputs and do not re-validate.

use clap::{Parser, ValueEnum};
use keybed::dsp::oscillator::Waveform;
use keybed::layout;

#[derive(Parser, Debug, Clone)]
#[command(name = "keybed", about = "Virtual piano keyboard in the terminal")]
pub struct Settings {
    /// Number of keys on the keyboard (12-30)
    #[arg(long, default_value_t = layout::DEFAULT_KEY_COUNT)]
    pub keys: i32,

    /// MIDI note of the leftmost key, 60 = middle C (21-96)
    #[arg(long, default_value_t = layout::DEFAULT_START_NOTE)]
    pub start_note: i32,

    /// Oscillator waveform for new notes
    #[arg(long, value_enum, default_value_t = WaveformArg::Sine)]
    pub waveform: WaveformArg,

    /// Output volume (0.0-1.0)
    #[arg(long, default_value_t = 0.5)]
    pub volume: f32,
}

impl Settings {
    pub fn clamped(mut self) -> Self {
        self.keys = self.keys.clamp(layout::MIN_KEY_COUNT, layout::MAX_KEY_COUNT);
        self.start_note = self
            .start_note
            .clamp(layout::MIN_START_NOTE, layout::MAX_START_NOTE);
        self.volume = self.volume.clamp(0.0, 1.0);
        self
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformArg {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

impl From<WaveformArg> for Waveform {
    fn from(arg: WaveformArg) -> Self {
        match arg {
            WaveformArg::Sine => Waveform::Sine,
            WaveformArg::Sawtooth => Waveform::Sawtooth,
            WaveformArg::Square => Waveform::Square,
            WaveformArg::Triangle => Waveform::Triangle,
        }
    }
}
