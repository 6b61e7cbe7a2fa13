//! Input dispatch: raw pointer and physical-key events in, logical
//! press/release events out.
//!
//! The dispatcher owns two pieces of state: the sustain latch and the set of
//! keys currently marked active. It never touches audio itself; note events
//! go through a [`NoteSink`], which the synth engine implements directly and
//! a front end can implement with a message queue.
//!
//! Within one event, the sink call happens before the active mark commits,
//! so "press was emitted" always implies "key is marked active" afterwards.

use crate::layout::bindings::TriggerIndex;
use crate::layout::KeyDescriptor;

/// A decoded physical key. Sustain is identified by key code (space) before
/// the character table is consulted, so it can never collide with a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalKey {
    Sustain,
    Char(char),
}

/// Receiver for logical note events.
pub trait NoteSink {
    fn press(&mut self, key: &KeyDescriptor);
    fn release(&mut self, key: &KeyDescriptor);
}

/// Translates pointer and physical-key events on one layout into note events.
pub struct InputDispatcher {
    sustain: bool,
    active: Vec<bool>,
    triggers: TriggerIndex,
}

impl InputDispatcher {
    pub fn new(keys: &[KeyDescriptor]) -> Self {
        Self {
            sustain: false,
            active: vec![false; keys.len()],
            triggers: TriggerIndex::new(keys),
        }
    }

    /// Whether the sustain latch is currently held.
    pub fn sustain_active(&self) -> bool {
        self.sustain
    }

    /// Whether the key at `position` is marked active (sounding or latched).
    pub fn is_active(&self, position: usize) -> bool {
        self.active.get(position).copied().unwrap_or(false)
    }

    /// Pointer pressed on a key: always forwarded; the engine guards
    /// duplicate voices.
    pub fn pointer_down(
        &mut self,
        keys: &[KeyDescriptor],
        position: usize,
        sink: &mut impl NoteSink,
    ) {
        debug_assert_eq!(keys.len(), self.active.len());
        sink.press(&keys[position]);
        self.active[position] = true;
    }

    /// Pointer released over a key. Suppressed (not queued) while sustain is
    /// held: the key stays active and sounding.
    pub fn pointer_up(
        &mut self,
        keys: &[KeyDescriptor],
        position: usize,
        sink: &mut impl NoteSink,
    ) {
        if self.sustain {
            return;
        }
        sink.release(&keys[position]);
        self.active[position] = false;
    }

    /// Pointer dragged off a key while pressed: same contract as release.
    pub fn pointer_leave(
        &mut self,
        keys: &[KeyDescriptor],
        position: usize,
        sink: &mut impl NoteSink,
    ) {
        self.pointer_up(keys, position, sink);
    }

    /// Physical key pressed. Space arms the sustain latch; a bound character
    /// presses its key unless it is already active (key repeat guard).
    pub fn physical_key_down(
        &mut self,
        keys: &[KeyDescriptor],
        key: PhysicalKey,
        sink: &mut impl NoteSink,
    ) {
        match key {
            PhysicalKey::Sustain => self.sustain = true,
            PhysicalKey::Char(c) => {
                if let Some(position) = self.triggers.position_of(c) {
                    if self.active[position] {
                        return;
                    }
                    sink.press(&keys[position]);
                    self.active[position] = true;
                }
            }
        }
    }

    /// Physical key released. Releasing space drops the latch and flushes a
    /// release for every key still marked active; releasing a bound
    /// character releases its key only while sustain is down.
    pub fn physical_key_up(
        &mut self,
        keys: &[KeyDescriptor],
        key: PhysicalKey,
        sink: &mut impl NoteSink,
    ) {
        match key {
            PhysicalKey::Sustain => {
                self.sustain = false;
                for position in 0..self.active.len() {
                    if self.active[position] {
                        sink.release(&keys[position]);
                        self.active[position] = false;
                    }
                }
            }
            PhysicalKey::Char(c) => {
                if self.sustain {
                    return;
                }
                if let Some(position) = self.triggers.position_of(c) {
                    sink.release(&keys[position]);
                    self.active[position] = false;
                }
            }
        }
    }
}
