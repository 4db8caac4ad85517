use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform white-noise source, one per voice.
///
/// Samples are drawn in [-0.5, 0.5). `SmallRng` is a small, fast,
/// non-cryptographic generator — one draw per audio sample with no
/// allocation, which is all the excitation stage needs. Seeding is
/// explicit so a voice renders the same excitation stream in tests.
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next excitation sample in [-0.5, 0.5).
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.rng.gen::<f32>() - 0.5
    }
}
