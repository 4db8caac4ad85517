pub mod dsp; // Realtime-safe signal primitives (noise, envelope, filter)
pub mod engine; // Host-facing front door: config, shared parameters, block render
pub mod synth; // Voice management and polyphony

/// Largest block a single render call may request. Per-voice scratch and
/// the engine mix buffer are sized against this at configure time so the
/// render path never allocates.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Floor applied to the resonance parameter before filter design. A Q at
/// or below zero makes the band-pass coefficients degenerate.
pub const MIN_RESONANCE: f32 = 0.0001;

/// Center frequencies are kept above this before filter design.
pub(crate) const MIN_CENTER_HZ: f32 = 20.0;
