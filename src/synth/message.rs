#[cfg(feature = "rtrb")]
use rtrb::Consumer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Note events handed to the render thread, one batch per block.
///
/// Velocity is normalized to 0.0-1.0. `allow_tail_off` selects between a
/// rendered release decay and an immediate, synchronous stop.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NoteEvent {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8, allow_tail_off: bool },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<NoteEvent>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<NoteEvent> {
    fn pop(&mut self) -> Option<NoteEvent> {
        Consumer::pop(self).ok()
    }
}
