//! Control messages from the input thread to the audio thread.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::oscillator::Waveform;

#[derive(Debug, Copy, Clone)]
pub enum EngineMessage {
    Press { note: i32, frequency: f32 },
    Release { note: i32 },
    SetWaveform(Waveform),
    SetVolume(f32),
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}
