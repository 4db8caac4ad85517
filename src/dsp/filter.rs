use std::f32::consts::TAU;

use crate::{MIN_CENTER_HZ, MIN_RESONANCE};

/*
Resonant Band-Pass Biquad
=========================

Second-order IIR band-pass (RBJ audio-EQ-cookbook, constant 0 dB peak
gain variant):

    w0    = 2π * center / sample_rate
    alpha = sin(w0) / (2 * Q)

    b0 =  alpha          a0 = 1 + alpha
    b1 =  0              a1 = -2 cos(w0)
    b2 = -alpha          a2 = 1 - alpha

all normalized by a0. Higher Q narrows the passband around the center
frequency, which is what turns broadband noise into a pitched tone.

State is kept in transposed direct form II (two delay elements), which is
numerically better behaved than direct form I at high Q.

Coefficient design is defensive rather than fallible: Q is floored at
MIN_RESONANCE and the center frequency clamped below Nyquist, so retune
can never produce NaN/Inf coefficients on the audio thread.
*/

pub struct ResonantBandPass {
    // Normalized coefficients
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // Transposed direct form II delay elements
    z1: f32,
    z2: f32,
}

impl ResonantBandPass {
    pub fn new() -> Self {
        Self {
            // Identity until the first retune
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Recompute coefficients for the given tuning. Out-of-range inputs
    /// are clamped, never rejected — this runs on the audio thread once
    /// per block. Leaves the delay state untouched so retuning mid-note
    /// doesn't click.
    pub fn retune(&mut self, sample_rate: f32, center_hz: f32, resonance: f32) {
        let q = if resonance.is_finite() {
            resonance.max(MIN_RESONANCE)
        } else {
            MIN_RESONANCE
        };
        let center = center_hz.clamp(MIN_CENTER_HZ, sample_rate * 0.45);

        let w0 = TAU * center / sample_rate;
        let alpha = w0.sin() / (2.0 * q);

        let a0 = 1.0 + alpha;
        self.b0 = alpha / a0;
        self.b1 = 0.0;
        self.b2 = -alpha / a0;
        self.a1 = -2.0 * w0.cos() / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Zero the delay elements. Required whenever a voice is reclaimed so
    /// no residual ringing leaks into the next note.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    #[inline]
    fn next_sample(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    /// Filter a block in place, carrying state across calls.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }
}

impl Default for ResonantBandPass {
    fn default() -> Self {
        Self::new()
    }
}
