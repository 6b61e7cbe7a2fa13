pub mod dsp;
pub mod input; // Typed press/release dispatch with sustain latching
pub mod layout; // Key geometry for a contiguous MIDI range
pub mod pitch;
pub mod synth; // Voice ownership and note lifecycle

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
