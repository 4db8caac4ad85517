/// Offline render demo: play a chord, release it, and report the
/// envelope of the resulting audio per block.
use noiseband::engine::{Engine, EngineConfig};
use noiseband::synth::NoteEvent;

fn main() {
    println!("=== noiseband offline chord render ===\n");

    let (mut engine, handle) = Engine::new(EngineConfig {
        sample_rate: 44_100.0,
        max_block_size: 512,
        polyphony: 8,
    });
    handle.set_master_gain(0.8);
    handle.set_resonance(4.0);

    let chord = [
        NoteEvent::NoteOn {
            note: 60,
            velocity: 1.0,
        },
        NoteEvent::NoteOn {
            note: 64,
            velocity: 0.9,
        },
        NoteEvent::NoteOn {
            note: 67,
            velocity: 0.8,
        },
    ];

    let mut buffer = vec![0.0f32; 512];

    println!("C major chord, 8 blocks held:");
    engine.render_block_with_events(&mut [&mut buffer], 0, 512, &chord);
    report(0, &buffer, &engine);
    for block in 1..8 {
        buffer.fill(0.0);
        engine.render_block_with_events(&mut [&mut buffer], 0, 512, &[]);
        report(block, &buffer, &engine);
    }

    println!("\nReleasing all notes (tail-off):");
    buffer.fill(0.0);
    engine.render_block_with_events(&mut [&mut buffer], 0, 512, &[NoteEvent::AllNotesOff]);
    report(8, &buffer, &engine);
    for block in 9..16 {
        buffer.fill(0.0);
        engine.render_block_with_events(&mut [&mut buffer], 0, 512, &[]);
        report(block, &buffer, &engine);
    }
}

fn report(block: usize, buffer: &[f32], engine: &Engine) {
    let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    println!(
        "  block {:2}: peak {:.4}, active voices {}",
        block,
        peak,
        engine.active_voices()
    );
}
