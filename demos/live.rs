/// Live playback demo: the cpal audio callback drives the engine while
/// this thread feeds note events through the lock-free handle — the same
/// two-thread split a host application would use.
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use noiseband::engine::{Engine, EngineConfig};
use noiseband::MAX_BLOCK_SIZE;

fn main() {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .expect("no audio output device available");
    let config = device
        .default_output_config()
        .expect("no default output config");

    let channels = config.channels() as usize;
    let sample_rate = config.sample_rate().0 as f32;
    println!(
        "Output: {} @ {} Hz, {} channel(s)",
        device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate,
        channels
    );

    let (mut engine, mut handle) = Engine::new(EngineConfig {
        sample_rate,
        max_block_size: MAX_BLOCK_SIZE,
        polyphony: 8,
    });
    handle.set_master_gain(0.8);
    handle.set_resonance(5.0);

    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];
    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                let mut offset = 0;
                while offset < frames {
                    let n = (frames - offset).min(MAX_BLOCK_SIZE);
                    mono[..n].fill(0.0);
                    engine.render_block(&mut [&mut mono[..n]], 0, n);
                    for i in 0..n {
                        let frame = (offset + i) * channels;
                        for c in 0..channels {
                            data[frame + c] = mono[i];
                        }
                    }
                    offset += n;
                }
            },
            |err| eprintln!("stream error: {}", err),
            None,
        )
        .expect("failed to build output stream");
    stream.play().expect("failed to start stream");

    // Noise arpeggio: each note excites its own band-pass tuned to the
    // pitch; higher resonance makes the tone purer.
    println!("Playing arpeggio (resonance 5.0)...");
    for &note in &[48u8, 55, 60, 64, 67, 72] {
        handle.note_on(note, 1.0);
        thread::sleep(Duration::from_millis(250));
        handle.note_off(note, true);
    }

    println!("Chord with rising resonance...");
    for &note in &[48u8, 60, 64, 67] {
        handle.note_on(note, 0.9);
    }
    for step in 0..20 {
        handle.set_resonance(2.0_f32.powf(step as f32 / 4.0));
        thread::sleep(Duration::from_millis(150));
    }
    handle.all_notes_off();
    thread::sleep(Duration::from_millis(500));
}
