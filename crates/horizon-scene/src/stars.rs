//! Star field: points scattered over the upper hemisphere of a sky shell.

use glam::Vec3;

use crate::noise::seeded_stream;

/// Star field parameters.
#[derive(Debug, Clone)]
pub struct StarFieldConfig {
    pub count: usize,
    /// Shell radius in world units.
    pub radius: f32,
    /// Added to `|y|` before normalization, pushing stars away from the horizon.
    pub y_bias: f32,
    pub seed: u64,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            count: 469,
            radius: 110.0,
            y_bias: 0.15,
            seed: 0x5EED_57A2,
        }
    }
}

/// Projects a raw sample onto the shell, or `None` when the sample has no
/// usable direction (the zero vector).
pub fn place_star(x: f32, y: f32, z: f32, radius: f32) -> Option<Vec3> {
    let v = Vec3::new(x, y, z);
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq < f32::EPSILON {
        return None;
    }
    Some(v * (radius / len_sq.sqrt()))
}

/// Generates `count` stars from a stream of uniform samples in `[-1, 1]`.
///
/// Each star consumes three samples: x, y (folded to `|y| + y_bias`), z.
/// Degenerate samples are discarded and redrawn. A finite stream that runs
/// dry ends generation early.
pub fn generate(
    count: usize,
    radius: f32,
    y_bias: f32,
    samples: impl IntoIterator<Item = f32>,
) -> Vec<Vec3> {
    let mut samples = samples.into_iter();
    let mut stars = Vec::with_capacity(count);
    let mut rejected = 0usize;

    while stars.len() < count {
        let (Some(x), Some(y), Some(z)) = (samples.next(), samples.next(), samples.next()) else {
            log::warn!("sample stream ended after {} of {count} stars", stars.len());
            break;
        };

        match place_star(x, y.abs() + y_bias, z, radius) {
            Some(star) => stars.push(star),
            None => rejected += 1,
        }
    }

    if rejected > 0 {
        log::debug!("resampled {rejected} degenerate star samples");
    }

    stars
}

/// Generated star positions. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    stars: Vec<Vec3>,
}

impl StarField {
    /// Draws the field from the configuration's seeded stream.
    pub fn generate(config: &StarFieldConfig) -> Self {
        let stars = generate(
            config.count,
            config.radius,
            config.y_bias,
            seeded_stream(config.seed, -1.0..=1.0),
        );
        Self { stars }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn generates_requested_count() {
        let field = StarField::generate(&StarFieldConfig::default());
        assert_eq!(field.len(), 469);
    }

    #[test]
    fn every_star_lies_on_the_upper_shell() {
        let config = StarFieldConfig::default();
        for star in StarField::generate(&config).positions() {
            assert!((star.length() - config.radius).abs() < EPS, "{star:?}");
            assert!(star.y >= 0.0, "{star:?}");
        }
    }

    #[test]
    fn zero_bias_still_stays_in_upper_hemisphere() {
        let stars = generate(1000, 50.0, 0.0, seeded_stream(3, -1.0..=1.0));
        assert_eq!(stars.len(), 1000);
        assert!(stars.iter().all(|s| s.y >= 0.0 && (s.length() - 50.0).abs() < EPS));
    }

    #[test]
    fn same_seed_same_field() {
        let config = StarFieldConfig::default();
        assert_eq!(StarField::generate(&config), StarField::generate(&config));
    }

    #[test]
    fn zero_vector_is_rejected() {
        assert_eq!(place_star(0.0, 0.0, 0.0, 110.0), None);
        assert_eq!(place_star(f32::NAN, 0.0, 0.0, 110.0), None);
    }

    #[test]
    fn degenerate_sample_is_resampled() {
        let samples = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let stars = generate(1, 110.0, 0.0, samples);
        assert_eq!(stars, vec![Vec3::new(0.0, 110.0, 0.0)]);
    }

    #[test]
    fn finite_stream_ends_early_without_garbage() {
        let stars = generate(5, 10.0, 0.15, [0.5, 0.5, 0.5]);
        assert_eq!(stars.len(), 1);
        assert!(stars[0].is_finite());
    }
}
