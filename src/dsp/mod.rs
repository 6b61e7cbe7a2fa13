//! Low-level DSP primitives embedded inside voices.
//!
//! Everything here is allocation-free and realtime-safe: plain structs
//! advancing one sample at a time, so they can live directly in the audio
//! callback without locks or heap traffic.

/// Attack/decay/sustain/release gain envelope.
pub mod envelope;
/// Audio-band waveform generators.
pub mod oscillator;

pub use envelope::EnvelopeStage;
pub use oscillator::Waveform;
