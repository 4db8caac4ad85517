use crate::synth::{message::NoteEvent, voice::Voice, voice::VoiceState};

/// Fixed-polyphony voice pool.
///
/// Owns N voices allocated once at construction and reused for the
/// engine's lifetime; note-on only rewrites state, there is no per-note
/// heap allocation. The pool dispatches events, assigns notes to voices,
/// steals when exhausted, and sums voice contributions into the caller's
/// buffer (the caller clears, the pool only adds).
pub struct PolySynth {
    voices: Vec<Voice>,
    frame_counter: u64,
}

impl PolySynth {
    pub fn new(sample_rate: f32, polyphony: usize) -> Self {
        debug_assert!(polyphony > 0);
        let voices = (0..polyphony.max(1))
            .map(|i| Voice::new(sample_rate, i as u64 + 1))
            .collect();

        Self {
            voices,
            frame_counter: 0,
        }
    }

    /// Assign `note` to a voice and start it. A note number that is
    /// already sounding retriggers its own voice — two voices never own
    /// the same pitch. With no free voice, a deterministic steal resolves
    /// the conflict; the new note is never dropped.
    pub fn note_on(&mut self, note: u8, velocity: f32, resonance: f32) {
        let age = self.frame_counter;
        let idx = self.find_assignable(note);
        let voice = &mut self.voices[idx];
        if voice.is_active() {
            // Steal path: hard-stop so the filter and envelope are clean
            // before the reassignment.
            voice.request_stop(false);
        }
        voice.start(note, velocity.clamp(0.0, 1.0), resonance, age);
    }

    /// Release the voice bound to `note`. A note-off for an unassigned
    /// note number is a silent no-op.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.note() == Some(note) && v.is_active())
        {
            voice.request_stop(allow_tail_off);
        }
    }

    /// Release every sounding voice with tail-off.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.request_stop(true);
            }
        }
    }

    /// Apply one event at the current block position.
    pub fn dispatch(&mut self, event: NoteEvent, resonance: f32) {
        match event {
            NoteEvent::NoteOn { note, velocity } => self.note_on(note, velocity, resonance),
            NoteEvent::NoteOff {
                note,
                allow_tail_off,
            } => self.note_off(note, allow_tail_off),
            NoteEvent::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Add every active voice's contribution into `out`. The caller must
    /// have cleared `out` (or be accumulating deliberately).
    pub fn render_block(&mut self, out: &mut [f32], resonance: f32) {
        for voice in &mut self.voices {
            voice.render(out, resonance);
        }
        self.frame_counter += out.len() as u64;
    }

    pub fn configure(&mut self, sample_rate: f32, max_block_size: usize) {
        for voice in &mut self.voices {
            voice.configure(sample_rate, max_block_size);
        }
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Voice index to use for a new note, in deterministic preference
    /// order:
    ///   1. the voice already sounding this note number (retrigger),
    ///   2. any free voice (lowest index),
    ///   3. the releasing voice whose tail-off is most decayed,
    ///   4. the oldest active voice (smallest start frame).
    /// Ties everywhere break toward the lowest index.
    fn find_assignable(&self, note: u8) -> usize {
        if let Some(idx) = self
            .voices
            .iter()
            .position(|v| v.note() == Some(note) && v.is_active())
        {
            return idx;
        }

        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return idx;
        }

        if let Some(idx) = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by(|(_, a), (_, b)| a.tail_off().total_cmp(&b.tail_off()))
            .map(|(idx, _)| idx)
        {
            return idx;
        }

        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx)
            .unwrap_or(0)
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
    fn note_off_for_unassigned_note_is_a_no_op() {
        let mut pool = PolySynth::new(SAMPLE_RATE, 4);
        pool.note_off(60, true);
        assert_eq!(pool.active_voices(), 0);
    }

    #[test]
    fn same_note_retriggers_not_duplicates() {
        let mut pool = PolySynth::new(SAMPLE_RATE, 4);
        pool.note_on(60, 1.0, 1.0);
        pool.note_on(60, 0.5, 1.0);
        assert_eq!(pool.active_voices(), 1, "one pitch, one voice");
    }

    #[test]
    fn pool_exhaustion_steals_deterministically() {
        let mut pool = PolySynth::new(SAMPLE_RATE, 4);
        for (i, note) in [60u8, 62, 64, 65].iter().enumerate() {
            // Distinct ages: render a block between note-ons
            let mut out = vec![0.0f32; 32];
            pool.render_block(&mut out, 1.0);
            pool.note_on(*note, 1.0, 1.0);
            assert_eq!(pool.active_voices(), i + 1);
        }

        // Fifth note on a full pool: the oldest (note 60, voice 0) goes
        pool.note_on(67, 1.0, 1.0);
        assert_eq!(pool.active_voices(), 4);
        let sounding: Vec<u8> = pool.voices.iter().filter_map(|v| v.note()).collect();
        assert!(sounding.contains(&67), "newest note must sound");
        assert!(!sounding.contains(&60), "oldest note must have been stolen");
    }

    #[test]
    fn steal_prefers_most_decayed_releasing_voice() {
        let mut pool = PolySynth::new(SAMPLE_RATE, 3);
        pool.note_on(60, 1.0, 1.0);
        pool.note_on(62, 1.0, 1.0);
        pool.note_on(64, 1.0, 1.0);

        // 62 starts releasing first, so it decays furthest
        pool.note_off(62, true);
        let mut out = vec![0.0f32; 128];
        pool.render_block(&mut out, 1.0);
        pool.note_off(64, true);
        out.fill(0.0);
        pool.render_block(&mut out, 1.0);

        pool.note_on(65, 1.0, 1.0);
        let sounding: Vec<u8> = pool.voices.iter().filter_map(|v| v.note()).collect();
        assert!(!sounding.contains(&62), "most-decayed voice should be stolen");
        assert!(sounding.contains(&64));
        assert!(sounding.contains(&65));
    }

    #[test]
    fn voices_sum_into_the_output() {
        let mut together = PolySynth::new(SAMPLE_RATE, 2);
        together.note_on(60, 1.0, 1.0);
        together.note_on(67, 1.0, 1.0);
        let mut out = vec![0.0f32; 512];
        together.render_block(&mut out, 1.0);

        // Pool voices are seeded by index (1, 2, ...), so standalone
        // voices with the same seeds replay the same excitation streams.
        let mut first = Voice::new(SAMPLE_RATE, 1);
        first.start(60, 1.0, 1.0, 0);
        let mut a = vec![0.0f32; 512];
        first.render(&mut a, 1.0);

        let mut second = Voice::new(SAMPLE_RATE, 2);
        second.start(67, 1.0, 1.0, 0);
        let mut b = vec![0.0f32; 512];
        second.render(&mut b, 1.0);

        assert!(energy(&out) > 0.0);
        for i in 0..512 {
            approx::assert_abs_diff_eq!(out[i], a[i] + b[i], epsilon = 1e-5);
        }
    }
}
