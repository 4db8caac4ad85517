use crate::dsp::{Envelope, NoiseSource, ResonantBandPass};
use crate::synth::midi_note_to_freq;
use crate::MAX_BLOCK_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Note held, envelope attacking or sustaining
    Releasing, // Note released, tail-off decaying
}

/// One independently-rendering unit for a single held note.
///
/// A voice owns its whole signal chain: a noise tap, an envelope, and a
/// resonant band-pass filter tuned to the note's pitch. It renders into a
/// private scratch block and only the filtered result is added into the
/// shared output, so one voice's filter is never excited by another
/// voice's samples — per-note timbre stays independent under polyphony.
///
/// Everything here is preallocated at pool construction; starting a note
/// only rewrites fields.
pub struct Voice {
    note: Option<u8>,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    center_hz: f32,

    noise: NoiseSource,
    envelope: Envelope,
    filter: ResonantBandPass,

    /// Private pre-filter block, sized once.
    scratch: Vec<f32>,
}

impl Voice {
    pub fn new(sample_rate: f32, seed: u64) -> Self {
        Self {
            note: None,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            center_hz: 0.0,
            noise: NoiseSource::new(seed),
            envelope: Envelope::new(),
            filter: ResonantBandPass::new(),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Bind this voice to a note. Valid from any state — the steal path
    /// guarantees a reset by going through `request_stop(false)` first,
    /// and a retrigger of the same note wants the reset anyway.
    pub fn start(&mut self, note: u8, velocity: f32, resonance: f32, age: u64) {
        self.filter.reset();
        self.envelope.trigger(velocity.clamp(0.0, 1.0));

        self.note = Some(note);
        self.center_hz = midi_note_to_freq(note);
        self.filter.retune(self.sample_rate, self.center_hz, resonance);
        self.age = age;
        self.state = VoiceState::Active;
    }

    /// Release the note. With tail-off the voice keeps rendering its
    /// decay and frees itself once the envelope terminates; without, it
    /// is reclaimed synchronously (hard note-off, voice stealing).
    pub fn request_stop(&mut self, allow_tail_off: bool) {
        if self.state == VoiceState::Free {
            return;
        }
        if allow_tail_off {
            // Idempotent: a voice already releasing keeps its trajectory.
            if self.state == VoiceState::Active {
                self.envelope.release();
                self.state = VoiceState::Releasing;
            }
        } else {
            self.envelope.force_finish();
            self.free();
        }
    }

    /// Render `out.len()` samples and add them into `out`. No-op when
    /// Free. `resonance` is the block's Q value, re-applied to the filter
    /// every call so control-thread changes land at block boundaries.
    pub fn render(&mut self, out: &mut [f32], resonance: f32) {
        if self.state == VoiceState::Free {
            return;
        }
        debug_assert!(out.len() <= self.scratch.len());
        let n = out.len().min(self.scratch.len());
        let scratch = &mut self.scratch[..n];

        // Dry excitation: noise shaped by the envelope. If the tail-off
        // terminates mid-block, the remainder of the private block is
        // zero-filled and the voice is reclaimed after filtering.
        let mut finished = false;
        let mut produced = n;
        for i in 0..n {
            let gain = self.envelope.advance();
            scratch[i] = self.noise.next() * gain;
            if self.state == VoiceState::Releasing && self.envelope.is_finished() {
                produced = i + 1;
                finished = true;
                break;
            }
        }
        scratch[produced..].fill(0.0);

        // Filter the voice's own block, then mix.
        self.filter.retune(self.sample_rate, self.center_hz, resonance);
        self.filter.process_in_place(scratch);
        for (o, s) in out.iter_mut().zip(scratch.iter()) {
            *o += *s;
        }

        if finished {
            self.free();
        }
    }

    /// Reconfigure after a host sample-rate or block-size change. Not
    /// part of the render path, so reallocation is fine here.
    pub fn configure(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        if self.scratch.len() < max_block_size {
            self.scratch.resize(max_block_size, 0.0);
        }
    }

    fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
        self.envelope.reset();
        // Free implies no residual filter energy for the next note.
        self.filter.reset();
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Decay position for steal ordering: smaller means further along.
    pub fn tail_off(&self) -> f32 {
        self.envelope.tail_off()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn energy(buf: &[f32]) -> f32 {
        buf.iter().map(|s| s * s).sum()
    }

    #[test]
    fn started_voice_produces_output() {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(60, 1.0, 1.0, 0);

        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, 1.0);
        assert!(energy(&out) > 0.0, "active voice should produce energy");
    }

    #[test]
    fn free_voice_renders_nothing() {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, 1.0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn hard_stop_frees_synchronously() {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(60, 1.0, 1.0, 0);
        voice.request_stop(false);

        assert!(voice.is_free());
        assert_eq!(voice.note(), None);

        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, 1.0);
        assert!(out.iter().all(|&s| s == 0.0), "freed voice must be silent");
    }

    #[test]
    fn tail_off_frees_within_bounded_samples() {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(60, 1.0, 1.0, 0);

        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, 1.0);
        voice.request_stop(true);
        assert_eq!(voice.state(), VoiceState::Releasing);

        // 0.99^n reaches the epsilon in ~530 samples; two blocks is ample.
        for _ in 0..4 {
            out.fill(0.0);
            voice.render(&mut out, 1.0);
        }
        assert!(voice.is_free(), "release must terminate");
    }

    #[test]
    fn reclaimed_voice_leaves_no_residual_ringing() {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(60, 1.0, 10.0, 0);

        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, 10.0);
        voice.request_stop(false);

        out.fill(0.0);
        voice.render(&mut out, 10.0);
        assert!(out.iter().all(|&s| s == 0.0), "reset voice must not ring");
    }

    #[test]
    fn mid_block_termination_zero_fills_tail() {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(60, 1.0, 1.0, 0);

        let mut out = vec![0.0f32; 256];
        voice.render(&mut out, 1.0);
        voice.request_stop(true);

        // One huge block comfortably covers the whole decay; the voice
        // must come out Free, with the filtered tail decaying into the
        // block rather than ending on a hard discontinuity.
        let mut tail = vec![0.0f32; 2048];
        voice.render(&mut tail, 1.0);
        assert!(voice.is_free());
        let last_quarter = &tail[1536..];
        assert!(
            energy(last_quarter) < 1e-4,
            "end of the termination block should be silent"
        );
    }
}
