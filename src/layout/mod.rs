//! Key geometry for a contiguous MIDI note range.
//!
//! `layout` turns (start note, key count) into positioned, typed key
//! descriptors in abstract layout units. The render surface scales those
//! units to whatever it draws on; the math here never changes with the
//! display.

pub mod bindings;

use crate::pitch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Width of one white key in layout units.
pub const UNIT_WIDTH: f32 = 40.0;
/// Height of a white key in layout units.
pub const FULL_HEIGHT: f32 = 150.0;
/// Black key width as a fraction of white key width.
pub const BLACK_WIDTH_RATIO: f32 = 0.6;
/// Black key height as a fraction of white key height.
pub const BLACK_HEIGHT_RATIO: f32 = 0.6;
/// How far past the left edge of the preceding white key a black key is
/// centered, as a fraction of white key width. Numerically equal to
/// `BLACK_WIDTH_RATIO` but the two are independent knobs.
pub const BLACK_OFFSET_FACTOR: f32 = 0.6;
/// Extra vertical space the embedding surface reserves below the keys.
pub const CHROME_MARGIN: f32 = 40.0;

/// Supported key-count range. Clamping happens in the settings layer before
/// `layout` is called; `layout` itself accepts anything.
pub const MIN_KEY_COUNT: i32 = 12;
pub const MAX_KEY_COUNT: i32 = 30;
pub const DEFAULT_KEY_COUNT: i32 = 24;

/// Supported start-note range (A0 through C7).
pub const MIN_START_NOTE: i32 = 21;
pub const MAX_START_NOTE: i32 = 96;
pub const DEFAULT_START_NOTE: i32 = 60;

/// Semitone classes are counted from MIDI 21 (A0): class 0 is the note
/// that is ≡ 21 (mod 12).
const CLASS_ANCHOR: i32 = 21;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    White,
    Black,
}

/// Axis-aligned rectangle in layout units. `y` is always 0 for piano keys
/// (single row); black keys are shorter, not lower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl KeyRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// One key of the generated keyboard. Immutable once produced; the rest of
/// the system refers to keys by MIDI note or by position in the layout vec.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescriptor {
    pub midi_note: i32,
    pub frequency_hz: f32,
    pub kind: KeyKind,
    pub rect: KeyRect,
    /// Draw order: black keys (2) render over white keys (1).
    pub stack_order: u8,
    /// Octave label, present only on the first key of each octave cycle.
    pub label: Option<String>,
    /// Physical keyboard character bound to this key's position in the
    /// range, if the position is within the binding table.
    pub trigger: Option<char>,
}

/// The W,B pattern of one octave cycle, indexed by semitone class.
const KEY_PATTERN: [KeyKind; 12] = [
    KeyKind::White,
    KeyKind::Black,
    KeyKind::White,
    KeyKind::Black,
    KeyKind::White,
    KeyKind::White,
    KeyKind::Black,
    KeyKind::White,
    KeyKind::Black,
    KeyKind::White,
    KeyKind::Black,
    KeyKind::White,
];

/// Generate descriptors for `key_count` keys starting at `start_note`.
///
/// Returns exactly `key_count` keys in ascending MIDI order, or an empty
/// vec when `key_count < 1`. White keys tile left-to-right with no gaps;
/// each black key straddles the boundary after the most recent white key.
pub fn layout(start_note: i32, key_count: i32) -> Vec<KeyDescriptor> {
    if key_count < 1 {
        return Vec::new();
    }

    let mut keys = Vec::with_capacity(key_count as usize);
    let mut white_count: i32 = 0;

    for i in 0..key_count {
        let note = start_note + i;
        let class = (note - CLASS_ANCHOR).rem_euclid(12) as usize;
        let kind = KEY_PATTERN[class];
        let trigger = bindings::trigger_for_position(i as usize);

        let (rect, stack_order, label) = match kind {
            KeyKind::White => {
                let rect = KeyRect {
                    x: white_count as f32 * UNIT_WIDTH,
                    y: 0.0,
                    width: UNIT_WIDTH,
                    height: FULL_HEIGHT,
                };
                white_count += 1;
                // Class 0 carries the octave label.
                let label = (class == 0).then(|| format!("C{}", pitch::octave_number(note)));
                (rect, 1, label)
            }
            KeyKind::Black => {
                let width = UNIT_WIDTH * BLACK_WIDTH_RATIO;
                let rect = KeyRect {
                    x: (white_count - 1) as f32 * UNIT_WIDTH + UNIT_WIDTH * BLACK_OFFSET_FACTOR
                        - width / 2.0,
                    y: 0.0,
                    width,
                    height: FULL_HEIGHT * BLACK_HEIGHT_RATIO,
                };
                (rect, 2, None)
            }
        };

        keys.push(KeyDescriptor {
            midi_note: note,
            frequency_hz: pitch::note_to_frequency(note),
            kind,
            rect,
            stack_order,
            label,
            trigger,
        });
    }

    keys
}

/// Total keyboard width in layout units: one unit per white key.
pub fn total_width(keys: &[KeyDescriptor]) -> f32 {
    let whites = keys.iter().filter(|k| k.kind == KeyKind::White).count();
    whites as f32 * UNIT_WIDTH
}

/// Find the key under a point, honoring stack order (black over white).
pub fn hit_test(keys: &[KeyDescriptor], x: f32, y: f32) -> Option<usize> {
    keys.iter()
        .enumerate()
        .filter(|(_, k)| k.rect.contains(x, y))
        .max_by_key(|(_, k)| k.stack_order)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_exactly_key_count_keys_ascending() {
        for (start, count) in [(21, 12), (60, 24), (96, 30), (48, 1)] {
            let keys = layout(start, count);
            assert_eq!(keys.len(), count as usize);
            for (i, key) in keys.iter().enumerate() {
                assert_eq!(key.midi_note, start + i as i32);
            }
        }
    }

    #[test]
    fn non_positive_key_count_yields_empty_layout() {
        assert!(layout(60, 0).is_empty());
        assert!(layout(60, -3).is_empty());
    }

    #[test]
    fn white_keys_tile_by_rank() {
        let keys = layout(60, 24);
        let mut rank = 0;
        for key in &keys {
            if key.kind == KeyKind::White {
                assert_eq!(key.rect.x, rank as f32 * UNIT_WIDTH);
                assert_eq!(key.rect.width, UNIT_WIDTH);
                assert_eq!(key.rect.height, FULL_HEIGHT);
                assert_eq!(key.rect.y, 0.0);
                assert_eq!(key.stack_order, 1);
                rank += 1;
            }
        }
        assert_eq!(total_width(&keys), rank as f32 * UNIT_WIDTH);
    }

    #[test]
    fn black_keys_straddle_the_following_boundary() {
        let keys = layout(60, 24);
        let mut whites_so_far: i32 = 0;
        for key in &keys {
            if key.kind == KeyKind::White {
                whites_so_far += 1;
                continue;
            }
            assert_eq!(key.stack_order, 2);
            assert_eq!(key.rect.width, UNIT_WIDTH * BLACK_WIDTH_RATIO);
            assert_eq!(key.rect.height, FULL_HEIGHT * BLACK_HEIGHT_RATIO);

            // Centered at offset-factor past the left edge of the white key
            // emitted just before it. A range that opens on a black key has
            // no prior white key and lands left of the surface; that edge
            // comes straight from the reference layout.
            let center = key.rect.x + key.rect.width / 2.0;
            let expected =
                (whites_so_far - 1) as f32 * UNIT_WIDTH + UNIT_WIDTH * BLACK_OFFSET_FACTOR;
            assert!((center - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn only_class_zero_carries_the_octave_label() {
        let keys = layout(21, 30);
        for key in &keys {
            let class = (key.midi_note - 21).rem_euclid(12);
            match &key.label {
                Some(label) => {
                    assert_eq!(class, 0);
                    assert_eq!(key.kind, KeyKind::White);
                    assert_eq!(
                        label,
                        &format!("C{}", key.midi_note.div_euclid(12) - 1)
                    );
                }
                None => assert_ne!(class, 0),
            }
        }
    }

    #[test]
    fn range_anchor_labels_the_first_key_of_a0() {
        // MIDI 21 is class 0, so the very first key is white and labeled.
        let keys = layout(21, 12);
        assert_eq!(keys[0].kind, KeyKind::White);
        assert_eq!(keys[0].label.as_deref(), Some("C0"));
    }

    #[test]
    fn class_math_survives_notes_below_the_anchor() {
        // Below MIDI 21 the class expression goes negative; rem_euclid keeps
        // the table index in range.
        let keys = layout(15, 6);
        assert_eq!(keys.len(), 6);
        // MIDI 15 → class (15-21).rem_euclid(12) = 6 → black.
        assert_eq!(keys[0].kind, KeyKind::Black);
    }

    #[test]
    fn triggers_bind_by_position_until_the_table_runs_out() {
        let keys = layout(21, 30);
        assert_eq!(keys[0].trigger, Some('a'));
        assert_eq!(keys[24].trigger, Some('m'));
        for key in &keys[25..] {
            assert_eq!(key.trigger, None);
        }
    }

    #[test]
    fn hit_test_prefers_black_keys() {
        let keys = layout(60, 13);
        // Probe a black key that overlaps the white row (x >= 0; a range
        // opening on a black key puts that first one off-surface).
        let (bi, black) = keys
            .iter()
            .enumerate()
            .find(|(_, k)| k.kind == KeyKind::Black && k.rect.x >= 0.0)
            .expect("range contains an overlapping black key");
        let cx = black.rect.x + black.rect.width / 2.0;
        let cy = black.rect.height / 2.0;
        assert_eq!(hit_test(&keys, cx, cy), Some(bi));

        // Below the black key's bottom edge the white key wins.
        let below = black.rect.height + 1.0;
        let hit = hit_test(&keys, cx, below).expect("still on the keyboard");
        assert_eq!(keys[hit].kind, KeyKind::White);

        // Off the surface entirely.
        assert_eq!(hit_test(&keys, -1.0, 10.0), None);
        assert_eq!(hit_test(&keys, 0.0, FULL_HEIGHT + 1.0), None);
    }
}
