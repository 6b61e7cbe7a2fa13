//! Benchmarks for the layout engine and the voice render path.
//!
//! Run with: cargo bench
//!
//! The render-path numbers matter against real-time deadlines: a 512-sample
//! block at 48 kHz must be produced within 10.67 ms.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use keybed::dsp::oscillator::{Oscillator, Waveform};
use keybed::layout;
use keybed::synth::VoiceEngine;

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    for &count in &[12, 24, 30] {
        group.bench_with_input(BenchmarkId::new("generate", count), &count, |b, &count| {
            b.iter(|| layout::layout(black_box(21), black_box(count)))
        });
    }

    let keys = layout::layout(21, 30);
    group.bench_function("hit_test", |b| {
        b.iter(|| layout::hit_test(black_box(&keys), black_box(250.0), black_box(40.0)))
    });

    group.finish();
}

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new(waveform);
            group.bench_with_input(
                BenchmarkId::new(waveform.name(), size),
                &size,
                |b, _| {
                    b.iter(|| osc.render(black_box(&mut buffer), black_box(440.0), SAMPLE_RATE))
                },
            );
        }
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    for &size in BLOCK_SIZES {
        // Eight held keys, a realistic two-hands worst case.
        let mut engine = VoiceEngine::new(SAMPLE_RATE, 32, Waveform::Sawtooth, 0.5);
        for note in [60, 62, 64, 65, 67, 69, 71, 72] {
            engine.press(note, keybed::pitch::note_to_frequency(note));
        }

        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(
            BenchmarkId::new("render_8_voices", size),
            &size,
            |b, _| b.iter(|| engine.render_block(black_box(&mut buffer))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_layout, bench_oscillator, bench_engine);
criterion_main!(benches);
