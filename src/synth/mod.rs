// Voice ownership and note lifecycle. This layer sits above the DSP
// primitives and maps logical press/release events onto sounding voices.

pub mod engine;
pub mod message;
pub mod voice;

pub use engine::VoiceEngine;
pub use message::EngineMessage;
