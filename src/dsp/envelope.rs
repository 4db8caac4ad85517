/*
Attack / Tail-off Envelope
==========================

This envelope has two working phases rather than a full ADSR:

  Level
    1.0 ┐      ╭────────────╮
        │     ╱              ╲
        │    ╱                ╲_
        │   ╱                   ╲__
    0.0 └──╱───────────────────────╲───→ Time
          Attack     Sustain    Tail-off

  attack     Linear ramp from 0 to 1 at note-on, ATTACK_RATE per sample.
             Saturates at 1.0 and holds while the gate stays high.

  tail_off   0.0 while sustaining. Release sets it to 1.0, after which it
             decays geometrically: tail_off *= DECAY_FACTOR each sample.
             Geometric decay matches how acoustic resonance dies away and
             never quite reaches zero, so a small epsilon decides when the
             envelope counts as finished.

The per-sample gain is level * attack while sustaining and
level * attack * tail_off while releasing, where level is the peak
amplitude taken from note velocity.

DECAY_FACTOR 0.99 gives a release in the tens-of-milliseconds range at
typical sample rates (0.99^n < 0.005 after n ≈ 527 samples, ~12 ms at
44.1 kHz).
*/

/// Per-sample attack increment. ~2.3 ms to full level at 44.1 kHz.
pub const ATTACK_RATE: f32 = 0.01;

/// Per-sample geometric decay applied to `tail_off` while releasing.
pub const DECAY_FACTOR: f32 = 0.99;

/// Once `tail_off` falls to this, the envelope reports finished and the
/// owning voice can be reclaimed.
pub const TAIL_EPSILON: f32 = 0.005;

/// Which working phase the envelope is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,       // No gate, gain is 0
    Sustaining, // Gate high, attack ramping or held at 1.0
    Releasing,  // Gate dropped, tail_off decaying toward 0
}

pub struct Envelope {
    level: f32,    // peak amplitude from velocity (0.0 - 1.0)
    attack: f32,   // 0.0 → 1.0 ramp, saturates
    tail_off: f32, // 0.0 while sustaining, else decaying from 1.0
    stage: EnvelopeStage,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            level: 0.0,
            attack: 0.0,
            tail_off: 0.0,
            stage: EnvelopeStage::Idle,
        }
    }

    /// Gate high: restart the attack ramp from zero at the given peak
    /// level. Resetting is what makes a retriggered note sound distinct
    /// instead of tied to the previous one.
    pub fn trigger(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
        self.attack = 0.0;
        self.tail_off = 0.0;
        self.stage = EnvelopeStage::Sustaining;
    }

    /// Gate low: begin the geometric tail-off. Idempotent — a second
    /// release request leaves an in-progress decay untouched.
    pub fn release(&mut self) {
        if self.stage == EnvelopeStage::Sustaining {
            self.tail_off = 1.0;
            self.stage = EnvelopeStage::Releasing;
        }
    }

    /// Hard stop: skip the decay entirely. Used for voice stealing and
    /// hard note-offs.
    pub fn force_finish(&mut self) {
        self.reset();
    }

    /// Gain for the current sample. Advances the envelope by exactly one
    /// sample, so call this once per rendered sample and never from a
    /// timer.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => 0.0,
            EnvelopeStage::Sustaining => {
                self.attack = (self.attack + ATTACK_RATE).min(1.0);
                self.level * self.attack
            }
            EnvelopeStage::Releasing => {
                let gain = self.level * self.attack * self.tail_off;
                self.tail_off *= DECAY_FACTOR;
                if self.tail_off <= TAIL_EPSILON {
                    self.reset();
                }
                gain
            }
        }
    }

    /// True once the tail-off has decayed below the termination epsilon
    /// (or the envelope was never triggered).
    pub fn is_finished(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Current decay position, 0.0 when not releasing. The voice pool
    /// uses this to pick the most-decayed voice when stealing.
    pub fn tail_off(&self) -> f32 {
        self.tail_off
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.attack = 0.0;
        self.tail_off = 0.0;
        self.stage = EnvelopeStage::Idle;
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
