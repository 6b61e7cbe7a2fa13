//! End-to-end session: layout → input dispatch → voice engine → audio.
//!
//! The engine implements `NoteSink` directly, so the whole chain runs
//! single-threaded here without the ring-buffer plumbing the binary uses.

use keybed::dsp::oscillator::Waveform;
use keybed::input::{InputDispatcher, PhysicalKey};
use keybed::layout::{self, KeyKind};
use keybed::synth::VoiceEngine;

const SAMPLE_RATE: f32 = 48_000.0;

fn render_peak(engine: &mut VoiceEngine, blocks: usize) -> f32 {
    let mut out = vec![0.0f32; 512];
    let mut peak = 0.0f32;
    for _ in 0..blocks {
        engine.render_block(&mut out);
        peak = out.iter().fold(peak, |m, s| m.max(s.abs()));
    }
    peak
}

#[test]
fn typing_a_key_makes_sound_and_letting_go_silences_it() {
    let keys = layout::layout(60, 24);
    let mut dispatcher = InputDispatcher::new(&keys);
    let mut engine = VoiceEngine::new(SAMPLE_RATE, 32, Waveform::Sine, 0.5);

    dispatcher.physical_key_down(&keys, PhysicalKey::Char('a'), &mut engine);
    assert!(engine.has_voice(60));
    assert!(render_peak(&mut engine, 8) > 0.1);

    dispatcher.physical_key_up(&keys, PhysicalKey::Char('a'), &mut engine);
    assert!(!engine.has_voice(60));

    // Past the release tail everything is silent again.
    render_peak(&mut engine, 40);
    let mut out = vec![0.0f32; 512];
    engine.render_block(&mut out);
    assert!(out.iter().all(|s| s.abs() < 1e-4));
    assert_eq!(engine.sounding_voices(), 0);
}

#[test]
fn sustain_holds_notes_until_the_latch_drops() {
    let keys = layout::layout(60, 24);
    let mut dispatcher = InputDispatcher::new(&keys);
    let mut engine = VoiceEngine::new(SAMPLE_RATE, 32, Waveform::Sawtooth, 0.5);

    dispatcher.physical_key_down(&keys, PhysicalKey::Sustain, &mut engine);
    dispatcher.physical_key_down(&keys, PhysicalKey::Char('a'), &mut engine);
    dispatcher.physical_key_down(&keys, PhysicalKey::Char('d'), &mut engine);
    assert_eq!(engine.live_voices(), 2);

    // Letting go of the character keys must not release the voices.
    dispatcher.physical_key_up(&keys, PhysicalKey::Char('a'), &mut engine);
    dispatcher.physical_key_up(&keys, PhysicalKey::Char('d'), &mut engine);
    assert_eq!(engine.live_voices(), 2);
    assert!(dispatcher.is_active(0));
    assert!(dispatcher.is_active(4));

    // Dropping the latch releases everything exactly once.
    dispatcher.physical_key_up(&keys, PhysicalKey::Sustain, &mut engine);
    assert_eq!(engine.live_voices(), 0);
    assert_eq!(engine.sounding_voices(), 2); // tails still ringing
    assert!(!dispatcher.is_active(0));
    assert!(!dispatcher.is_active(4));
}

#[test]
fn clicking_a_key_through_the_hit_test_plays_it() {
    let keys = layout::layout(60, 24);
    let mut dispatcher = InputDispatcher::new(&keys);
    let mut engine = VoiceEngine::new(SAMPLE_RATE, 32, Waveform::Sine, 0.5);

    // Click the center of the first white key.
    let (position, white) = keys
        .iter()
        .enumerate()
        .find(|(_, k)| k.kind == KeyKind::White)
        .expect("layout has white keys");
    let cx = white.rect.x + white.rect.width / 2.0;
    let cy = white.rect.height - 1.0;

    let hit = layout::hit_test(&keys, cx, cy).expect("click lands on a key");
    assert_eq!(hit, position);

    dispatcher.pointer_down(&keys, hit, &mut engine);
    assert!(engine.has_voice(keys[hit].midi_note));

    dispatcher.pointer_up(&keys, hit, &mut engine);
    assert!(!engine.has_voice(keys[hit].midi_note));
}

#[test]
fn held_keyboard_keys_survive_pointer_activity() {
    let keys = layout::layout(60, 24);
    let mut dispatcher = InputDispatcher::new(&keys);
    let mut engine = VoiceEngine::new(SAMPLE_RATE, 32, Waveform::Triangle, 0.5);

    dispatcher.physical_key_down(&keys, PhysicalKey::Char('f'), &mut engine);
    dispatcher.pointer_down(&keys, 0, &mut engine);
    dispatcher.pointer_up(&keys, 0, &mut engine);

    // The key held on the keyboard is untouched by the mouse release.
    assert_eq!(engine.live_voices(), 1);
    assert!(engine.has_voice(keys[5].midi_note));
}
