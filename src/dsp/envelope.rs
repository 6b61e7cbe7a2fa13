//! ADSR gain envelope.
//!
//! The shape matches the instrument's reference voicing: a linear attack to
//! full level, an exponential-curve decay down to the sustain level, a hold
//! while the gate is high, and a linear release to silence.
//!
//!   Level
//!     1.0 ┐     ╱╲
//!         │    ╱  ‾╲__________
//!     S   │   ╱               ╲
//!         │  ╱                 ╲
//!     0.0 └─╱───────────────────╲──→ Time
//!         Attack Decay  Sustain  Release
//!
//! The mixed curve types (linear attack, exponential decay, linear release)
//! are the audible envelope of the instrument; keep them as they are.
//!
//! Release starts from a snapshot of the live level, from ANY stage. A gate
//! drop in the middle of the attack or decay therefore replaces whatever
//! ramp was in flight instead of fighting it, so the release can never be
//! clobbered by a stale decay target.
//!
//! Exponential decay follows the audio-clock ramp convention
//! `v(t) = v0 * (v1/v0)^progress`, which is why the sustain target is kept
//! strictly positive: the curve can approach zero but never pass through it.

use crate::MIN_TIME;

/// Default envelope timing for piano voices.
pub const ATTACK_TIME: f32 = 0.05;
pub const DECAY_TIME: f32 = 0.2;
pub const SUSTAIN_LEVEL: f32 = 0.7;
pub const RELEASE_TIME: f32 = 0.3;

/// Smallest sustain target the exponential decay can aim at.
const MIN_SUSTAIN: f32 = 1e-4;

/// Stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // Gate low, level = 0
    Attack,  // Gate just went high, linear ramp up to 1.0
    Decay,   // Reached peak, exponential ramp down to sustain
    Sustain, // Holding while the gate stays high
    Release, // Gate went low, linear ramp down to 0
}

pub struct Envelope {
    // Shape parameters
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    // Runtime state
    stage: EnvelopeStage,
    level: f32,

    // Decay bookkeeping (sample counts fixed when the attack peaks)
    decay_total_samples: u32,
    decay_elapsed_samples: u32,

    // Release bookkeeping (snapshot taken at gate drop for precision)
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    /// Envelope with the instrument's reference timing.
    pub fn new() -> Self {
        Self::adsr(ATTACK_TIME, DECAY_TIME, SUSTAIN_LEVEL, RELEASE_TIME)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(MIN_SUSTAIN, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeStage::Idle,
            level: 0.0,
            decay_total_samples: 1,
            decay_elapsed_samples: 0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: restart the attack from zero for a clean retrigger.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.decay_elapsed_samples = 0;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: release from the current level, whatever stage we are in.
    pub fn note_off(&mut self, sample_rate: f32) {
        if matches!(self.stage, EnvelopeStage::Idle) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance by one sample.
    pub fn next_sample(&mut self, sample_rate: f32) {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                let increment = 1.0 / (self.attack_time * sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_total_samples =
                        (self.decay_time * sample_rate).round().max(1.0) as u32;
                    self.decay_elapsed_samples = 0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                // level = 1.0 * sustain^progress, the exponential ramp shape
                self.decay_elapsed_samples = self.decay_elapsed_samples.saturating_add(1);
                let progress =
                    self.decay_elapsed_samples as f32 / self.decay_total_samples as f32;
                self.level = self.sustain_level.powf(progress);

                if self.decay_elapsed_samples >= self.decay_total_samples {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                // Linear interpolation from the snapshot down to 0.
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            self.next_sample(sample_rate);
            *sample = self.level;
        }
    }

    /// True while the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
