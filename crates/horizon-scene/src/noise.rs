//! Deterministic randomness for geometry generation.
//!
//! Two flavours:
//! - a seeded uniform stream (ChaCha8), used to scatter stars
//! - coherent 1D noise (Perlin), used to shape the mountain ridge so that
//!   neighbouring samples are correlated instead of jagged

use std::ops::RangeInclusive;

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Sampling step along the noise axis per integer index.
///
/// Perlin noise is zero at every lattice point, so sampling integer indices
/// directly would yield a flat ridge; a sub-unit step also keeps adjacent
/// indices correlated.
pub const DEFAULT_FREQUENCY: f64 = 0.05;

/// Endless stream of uniform reals in `range`, reproducible for a given seed.
pub fn seeded_stream(seed: u64, range: RangeInclusive<f32>) -> impl Iterator<Item = f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    std::iter::repeat_with(move || rng.random_range(range.clone()))
}

/// Coherent noise source. `smooth_noise_1d` is a pure function of `(seed, index)`.
#[derive(Clone, Debug)]
pub struct NoiseSource {
    perlin: Perlin,
    frequency: f64,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self::with_frequency(seed, DEFAULT_FREQUENCY)
    }

    pub fn with_frequency(seed: u64, frequency: f64) -> Self {
        // Perlin takes a 32-bit seed; fold the high half in rather than dropping it.
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            perlin: Perlin::new(folded),
            frequency,
        }
    }

    /// Smooth noise in `[0, 1]` for a sample index.
    pub fn smooth_noise_1d(&self, index: u32) -> f32 {
        let x = f64::from(index) * self.frequency;
        let raw = self.perlin.get([x, 0.0]);
        ((raw * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_is_reproducible_and_in_range() {
        let a: Vec<f32> = seeded_stream(7, -1.0..=1.0).take(256).collect();
        let b: Vec<f32> = seeded_stream(7, -1.0..=1.0).take(256).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn different_seeds_give_different_streams() {
        let a: Vec<f32> = seeded_stream(1, 0.0..=1.0).take(16).collect();
        let b: Vec<f32> = seeded_stream(2, 0.0..=1.0).take(16).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn smooth_noise_is_pure() {
        let n1 = NoiseSource::new(123_456);
        let n2 = NoiseSource::new(123_456);
        for i in 0..500 {
            assert_eq!(n1.smooth_noise_1d(i), n2.smooth_noise_1d(i));
        }
    }

    #[test]
    fn smooth_noise_stays_in_unit_range() {
        let n = NoiseSource::new(99);
        assert!((0..2000).map(|i| n.smooth_noise_1d(i)).all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn adjacent_samples_are_correlated() {
        let n = NoiseSource::new(123_456);
        let samples: Vec<f32> = (0..369).map(|i| n.smooth_noise_1d(i)).collect();

        let mean_step = samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .sum::<f32>()
            / (samples.len() - 1) as f32;
        // Independent uniform samples would average ~1/3 here.
        assert!(mean_step < 0.1, "mean step {mean_step}");

        let (lo, hi) = samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        assert!(hi - lo > 0.05, "noise is flat: {lo}..{hi}");
    }
}
