//! Equal-tempered pitch math, anchored at A4 = MIDI 69 = 440 Hz.

/// Convert a MIDI note number to its frequency in Hz.
///
/// 12-tone equal temperament: `f = 440 * 2^((n - 69) / 12)`. Accepts any
/// integer; range policy lives in the layout layer, not here.
#[inline]
pub fn note_to_frequency(note: i32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69) as f32 / 12.0)
}

/// Octave number of a MIDI note in the C-1 convention (MIDI 60 → octave 4).
///
/// Euclidean division keeps the result correct below MIDI 12.
#[inline]
pub fn octave_number(note: i32) -> i32 {
    note.div_euclid(12) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(note_to_frequency(69), 440.0);
    }

    #[test]
    fn octave_up_doubles_frequency() {
        for note in -24..=120 {
            let low = note_to_frequency(note);
            let high = note_to_frequency(note + 12);
            assert!(
                (high / low - 2.0).abs() < 1e-5,
                "octave above {note} should double: {low} -> {high}"
            );
        }
    }

    #[test]
    fn middle_c_is_octave_4() {
        assert_eq!(octave_number(60), 4);
        assert_eq!(octave_number(21), 0);
        assert_eq!(octave_number(11), -1);
        assert_eq!(octave_number(-1), -2);
    }
}
