// Purpose: voice management, polyphony, note event handling.
// This layer sits above the dsp primitives and below the engine front door.

pub mod message;
pub mod poly;
pub mod voice;

pub use message::NoteEvent;
pub use poly::PolySynth;
pub use voice::{Voice, VoiceState};

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
