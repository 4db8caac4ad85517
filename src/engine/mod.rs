//! Host-facing front door for the synthesis engine.
//!
//! The host audio callback owns an [`Engine`] and calls
//! [`Engine::render_block`] once per hardware block; the control and
//! input threads own an [`EngineHandle`] and talk to the audio thread
//! only through a lock-free SPSC event queue and atomic parameters.
//! Nothing on the render path blocks or allocates — every buffer is
//! sized at [`Engine::configure`] time.

pub mod params;

use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

pub use params::EngineParams;

use crate::synth::{NoteEvent, PolySynth};
use crate::MAX_BLOCK_SIZE;

/// Capacity of the control→audio event queue. An overflowing queue drops
/// the newest events; at one drain per block, overflow needs hundreds of
/// events inside a single block.
#[cfg(feature = "rtrb")]
const EVENT_QUEUE_SIZE: usize = 256;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_block_size: usize,
    pub polyphony: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_block_size: 512,
            polyphony: 16,
        }
    }
}

/// The synthesis engine proper. Lives on the audio thread.
pub struct Engine {
    synth: PolySynth,
    params: Arc<EngineParams>,
    #[cfg(feature = "rtrb")]
    events: Consumer<NoteEvent>,
    sample_rate: f32,
    /// Mono mix bus the pool renders into before the per-channel
    /// gain/clamp stage.
    mix: Vec<f32>,
}

/// Control-thread side of an [`Engine`]. Note events go through the
/// SPSC queue; parameters are plain atomic stores, callable at any time.
#[cfg(feature = "rtrb")]
pub struct EngineHandle {
    events: Producer<NoteEvent>,
    params: Arc<EngineParams>,
}

#[cfg(feature = "rtrb")]
impl EngineHandle {
    /// Queue a note-on. Dropped (newest-first) if the queue is full.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let _ = self.events.push(NoteEvent::NoteOn { note, velocity });
    }

    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        let _ = self.events.push(NoteEvent::NoteOff {
            note,
            allow_tail_off,
        });
    }

    pub fn all_notes_off(&mut self) {
        let _ = self.events.push(NoteEvent::AllNotesOff);
    }

    /// Set the band-pass Q. Hosts exposing a linear control should map it
    /// exponentially (e.g. `2^x`) before calling, so perceptual steps in
    /// tone purity stay even.
    pub fn set_resonance(&self, q: f32) {
        self.params.set_resonance(q);
    }

    pub fn set_master_gain(&self, gain: f32) {
        self.params.set_master_gain(gain);
    }
}

impl Engine {
    /// Build an engine and its control handle. The engine is ready to
    /// render at the configured rate; call [`Engine::configure`] again if
    /// the host renegotiates.
    #[cfg(feature = "rtrb")]
    pub fn new(config: EngineConfig) -> (Self, EngineHandle) {
        let (tx, rx) = RingBuffer::<NoteEvent>::new(EVENT_QUEUE_SIZE);
        let params = Arc::new(EngineParams::default());

        let mut engine = Self {
            synth: PolySynth::new(config.sample_rate, config.polyphony),
            params: Arc::clone(&params),
            events: rx,
            sample_rate: config.sample_rate,
            mix: vec![0.0; config.max_block_size.max(MAX_BLOCK_SIZE)],
        };
        engine.configure(config.sample_rate, config.max_block_size);
        let handle = EngineHandle {
            events: tx,
            params,
        };
        (engine, handle)
    }

    /// Queue-free construction for offline rendering and tests: events
    /// are supplied per block via [`Engine::render_block_with_events`].
    #[cfg(not(feature = "rtrb"))]
    pub fn new(config: EngineConfig) -> Self {
        let params = Arc::new(EngineParams::default());
        let mut engine = Self {
            synth: PolySynth::new(config.sample_rate, config.polyphony),
            params,
            sample_rate: config.sample_rate,
            mix: vec![0.0; config.max_block_size.max(MAX_BLOCK_SIZE)],
        };
        engine.configure(config.sample_rate, config.max_block_size);
        engine
    }

    /// Adopt a new sample rate / maximum block size. Idempotent; must be
    /// called from the same context that renders (hosts stop the stream
    /// around reconfiguration), never concurrently with `render_block`.
    pub fn configure(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.synth.configure(sample_rate, max_block_size);
        if self.mix.len() < max_block_size {
            self.mix.resize(max_block_size, 0.0);
        }
    }

    /// Shared parameter block, for wiring additional controls.
    pub fn params(&self) -> Arc<EngineParams> {
        Arc::clone(&self.params)
    }

    /// Render one block: drain queued events, dispatch them at the block
    /// start, mix all voices, then add the engine's contribution into
    /// every channel with master gain applied and a hard clamp to
    /// [-1, 1]. Never blocks, never allocates.
    #[cfg(feature = "rtrb")]
    pub fn render_block(&mut self, channels: &mut [&mut [f32]], start: usize, len: usize) {
        let resonance = self.params.resonance();
        while let Ok(event) = self.events.pop() {
            self.synth.dispatch(event, resonance);
        }
        self.mix_and_write(channels, start, len, resonance);
    }

    /// Render one block with an explicit event batch instead of the
    /// queue. Events apply at the start of the block, matching the
    /// queue-driven path.
    pub fn render_block_with_events(
        &mut self,
        channels: &mut [&mut [f32]],
        start: usize,
        len: usize,
        events: &[NoteEvent],
    ) {
        let resonance = self.params.resonance();
        for event in events {
            self.synth.dispatch(*event, resonance);
        }
        self.mix_and_write(channels, start, len, resonance);
    }

    fn mix_and_write(
        &mut self,
        channels: &mut [&mut [f32]],
        start: usize,
        len: usize,
        resonance: f32,
    ) {
        let len = len.min(self.mix.len());
        let mix = &mut self.mix[..len];
        mix.fill(0.0);
        self.synth.render_block(mix, resonance);

        let gain = self.params.master_gain();
        for channel in channels.iter_mut() {
            let slice = &mut channel[start..start + len];
            for (out, &m) in slice.iter_mut().zip(mix.iter()) {
                *out = (*out + m * gain).clamp(-1.0, 1.0);
            }
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn active_voices(&self) -> usize {
        self.synth.active_voices()
    }
}
