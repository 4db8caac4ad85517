use std::sync::atomic::{AtomicU32, Ordering};

use crate::MIN_RESONANCE;

/// Live-updatable engine parameters, shared between the control thread
/// and the audio thread.
///
/// Writers and readers race by design, so each field is a single word
/// stored as f32 bits in an `AtomicU32` — no tearing, no lock the audio
/// callback could ever contend on. Relaxed ordering is enough: a read
/// that is stale by one update only delays a perceptual parameter change
/// by one block.
pub struct EngineParams {
    resonance: AtomicU32,
    master_gain: AtomicU32,
}

impl EngineParams {
    pub fn new(resonance: f32, master_gain: f32) -> Self {
        let params = Self {
            resonance: AtomicU32::new(0),
            master_gain: AtomicU32::new(0),
        };
        params.set_resonance(resonance);
        params.set_master_gain(master_gain);
        params
    }

    /// Store a new Q. Non-finite and non-positive values are clamped to
    /// the floor instead of reaching the filter design.
    pub fn set_resonance(&self, q: f32) {
        let q = if q.is_finite() { q.max(MIN_RESONANCE) } else { MIN_RESONANCE };
        self.resonance.store(q.to_bits(), Ordering::Relaxed);
    }

    pub fn resonance(&self) -> f32 {
        f32::from_bits(self.resonance.load(Ordering::Relaxed))
    }

    pub fn set_master_gain(&self, gain: f32) {
        let gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
        self.master_gain.store(gain.to_bits(), Ordering::Relaxed);
    }

    pub fn master_gain(&self) -> f32 {
        f32::from_bits(self.master_gain.load(Ordering::Relaxed))
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
