//! Mountain ridge: a closed triangle strip of base/peak pairs around the
//! viewer, flattened into a dip near the front and back of the horizon.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};

use glam::Vec3;

use crate::noise::NoiseSource;

/// Height of every base vertex.
pub const BASE_Y: f32 = -1.0;

/// Ridge parameters.
#[derive(Debug, Clone)]
pub struct RidgeConfig {
    pub tops: u32,
    pub radius: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub seed: u64,
    /// Half-width of the horizon dip, in radians.
    pub dip_angle: f32,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            tops: 369,
            radius: 100.0,
            y_min: 9.0,
            y_max: 12.0,
            seed: 123_456,
            dip_angle: FRAC_PI_6,
        }
    }
}

impl RidgeConfig {
    /// `2 * tops + 2`: one base and one peak per top plus the closing pair.
    pub fn vertex_count(&self) -> usize {
        vertex_count(self.tops)
    }
}

pub fn vertex_count(tops: u32) -> usize {
    2 * tops as usize + 2
}

/// Ridge with the default dip angle.
pub fn generate(tops: u32, radius: f32, y_min: f32, y_max: f32, seed: u64) -> Vec<Vec3> {
    generate_with(&RidgeConfig {
        tops,
        radius,
        y_min,
        y_max,
        seed,
        ..RidgeConfig::default()
    })
}

/// Generates the ridge strip. Deterministic for a given configuration.
pub fn generate_with(config: &RidgeConfig) -> Vec<Vec3> {
    let tops = config.tops;
    if tops == 0 {
        return Vec::new();
    }

    let noise = NoiseSource::new(config.seed);
    let mut vertices = Vec::with_capacity(vertex_count(tops));

    for i in 0..tops {
        let angle = i as f32 * (TAU / tops as f32) - FRAC_PI_2;
        let (z, x) = angle.sin_cos();

        let t = noise.smooth_noise_1d(i);
        let y = (config.y_max - config.y_min) * t + config.y_min;

        // x and z come from a unit circle, but normalize anyway so the
        // radius is exact.
        let scale = config.radius / (x * x + z * z).sqrt();
        let (x, z) = (x * scale, z * scale);

        vertices.push(Vec3::new(x, BASE_Y, z));
        vertices.push(Vec3::new(x, y, z));
    }

    vertices.push(vertices[0]);
    vertices.push(vertices[1]);

    apply_dip(&mut vertices, tops, config.dip_angle);
    vertices
}

/// Lowers the peaks nearest the start of the ring (and their mirror from the
/// end) along a half sine, dropping them to the base where it is negative.
///
/// Only odd indices are touched. With an even vertex count `len - i` is odd
/// too, so every modified vertex is a peak and the closing pair stays equal
/// to the first pair.
fn apply_dip(vertices: &mut [Vec3], tops: u32, dip_angle: f32) {
    let angle_step = (TAU - 2.0 * dip_angle) / tops as f32;
    // Also rejects NaN.
    if !(angle_step > 0.0 && dip_angle > 0.0) {
        return;
    }

    let samples = ((dip_angle / angle_step) as usize).min(tops as usize);
    let len = vertices.len();

    for i in (1..samples).step_by(2) {
        let magnitude = (std::f32::consts::PI * i as f32 / samples as f32 - FRAC_PI_2).sin();
        if magnitude <= 0.0 {
            vertices[i].y = BASE_Y;
            vertices[len - i].y = BASE_Y;
        } else {
            vertices[i].y *= magnitude;
            vertices[len - i].y *= magnitude;
        }
    }
}
