//! Low-level DSP primitives used by the voice layer.
//!
//! These components are allocation-free and realtime-safe, making them safe
//! to embed directly inside voice structs. They intentionally stay focused
//! on the signal-processing math so the synth layer can handle note
//! assignment and mixing.

/// Attack ramp plus geometric tail-off envelope.
pub mod envelope;
/// Second-order resonant band-pass filter.
pub mod filter;
/// Uniform white-noise excitation source.
pub mod noise;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::ResonantBandPass;
pub use noise::NoiseSource;
