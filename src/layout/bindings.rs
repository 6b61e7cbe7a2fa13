//! Physical-key bindings for the generated range.
//!
//! Bindings attach to the key's *position* in the layout (0-based), not to
//! its MIDI note, so the same home-row shape plays whatever range is
//! configured. Positions past the table simply have no binding.

use std::collections::HashMap;

use super::KeyDescriptor;

/// Two octaves plus one: home row for naturals, the row above for sharps,
/// wrapping to the bottom row for the second octave.
pub const TRIGGER_KEYS: [char; 25] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p', ';', '\'',
    'z', 'x', 'c', 'v', 'b', 'n', 'm',
];

/// Binding for a position in the range, if any.
#[inline]
pub fn trigger_for_position(position: usize) -> Option<char> {
    TRIGGER_KEYS.get(position).copied()
}

/// Precomputed inverse of the binding table for one layout: character →
/// position. Built once so event handling never scans the table.
#[derive(Debug, Clone)]
pub struct TriggerIndex {
    by_char: HashMap<char, usize>,
}

impl TriggerIndex {
    pub fn new(keys: &[KeyDescriptor]) -> Self {
        let by_char = keys
            .iter()
            .enumerate()
            .filter_map(|(position, key)| key.trigger.map(|c| (c, position)))
            .collect();
        Self { by_char }
    }

    /// Position of the key bound to `c`, if `c` is bound in this layout.
    #[inline]
    pub fn position_of(&self, c: char) -> Option<usize> {
        self.by_char.get(&c).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;

    #[test]
    fn index_inverts_the_table() {
        let keys = layout(60, 30);
        let index = TriggerIndex::new(&keys);
        for (position, key) in keys.iter().enumerate() {
            match key.trigger {
                Some(c) => assert_eq!(index.position_of(c), Some(position)),
                None => assert!(position >= TRIGGER_KEYS.len()),
            }
        }
    }

    #[test]
    fn unbound_characters_resolve_to_nothing() {
        let keys = layout(60, 24);
        let index = TriggerIndex::new(&keys);
        assert_eq!(index.position_of('1'), None);
        assert_eq!(index.position_of('q'), None);
        // 'm' is position 24, outside a 24-key layout.
        assert_eq!(index.position_of('m'), None);
    }
}
