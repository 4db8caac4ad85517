//! Benchmarks for DSP primitives and full-engine rendering.
//!
//! Run with: cargo bench
//!
//! These measure whether core operations complete comfortably inside
//! real-time audio deadlines.
//!
//! Reference timing at 44.1kHz sample rate:
//!   - 64 samples  = 1.45ms deadline
//!   - 128 samples = 2.90ms deadline
//!   - 256 samples = 5.80ms deadline
//!   - 512 samples = 11.6ms deadline

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use noiseband::dsp::{Envelope, NoiseSource, ResonantBandPass};
use noiseband::engine::{Engine, EngineConfig};
use noiseband::synth::NoteEvent;

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    for &size in BLOCK_SIZES {
        let mut noise = NoiseSource::new(1);
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("fill", size), &size, |b, _| {
            b.iter(|| {
                for slot in buffer.iter_mut() {
                    *slot = noise.next();
                }
                black_box(&buffer);
            })
        });
    }
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack/sustain phase
        let mut env = Envelope::new();
        env.trigger(1.0);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                for slot in buffer.iter_mut() {
                    *slot = env.advance();
                }
                black_box(&buffer);
            })
        });

        // Tail-off phase: retrigger and release each iteration so the
        // decay never terminates mid-measurement
        let mut env = Envelope::new();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.trigger(1.0);
                env.release();
                for slot in buffer.iter_mut() {
                    *slot = env.advance();
                }
                black_box(&buffer);
            })
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    for &size in BLOCK_SIZES {
        let mut filter = ResonantBandPass::new();
        filter.retune(44_100.0, 440.0, 5.0);
        let mut buffer = vec![0.25f32; size];
        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                filter.process_in_place(black_box(&mut buffer));
            })
        });
    }
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    for &polyphony in &[4usize, 16] {
        let (mut engine, handle) = Engine::new(EngineConfig {
            sample_rate: 44_100.0,
            max_block_size: 512,
            polyphony,
        });
        handle.set_master_gain(0.8);
        handle.set_resonance(2.0);

        // Saturate the pool with held notes
        let chord: Vec<NoteEvent> = (0..polyphony)
            .map(|i| NoteEvent::NoteOn {
                note: 48 + i as u8 * 3,
                velocity: 1.0,
            })
            .collect();
        let mut buffer = vec![0.0f32; 512];
        engine.render_block_with_events(&mut [&mut buffer], 0, 512, &chord);

        group.bench_with_input(
            BenchmarkId::new("full_pool_512", polyphony),
            &polyphony,
            |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    engine.render_block_with_events(&mut [&mut buffer], 0, 512, &[]);
                    black_box(&buffer);
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_noise, bench_envelope, bench_filter, bench_engine);
criterion_main!(benches);
