use std::path::PathBuf;

use glam::Vec3;

use crate::camera::CameraConfig;
use crate::mountains::RidgeConfig;
use crate::stars::StarFieldConfig;

/// Overrides [`SceneConfig::shader_dir`] when set.
pub const SHADER_DIR_ENV: &str = "HORIZON_SHADER_DIR";

/// Per-layer constants fed to the shaders each frame.
#[derive(Debug, Clone)]
pub struct LayerSettings {
    /// Sun position relative to the camera.
    pub sun_offset: Vec3,
    pub sun_scale: f32,
    pub star_scale: f32,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            sun_offset: Vec3::new(0.0, 5.0, -100.0),
            sun_scale: 12.0,
            star_scale: 0.1,
        }
    }
}

/// Everything the scene needs at startup. Counts are fixed for the lifetime
/// of the app.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub stars: StarFieldConfig,
    pub ridge: RidgeConfig,
    pub camera: CameraConfig,
    pub layers: LayerSettings,
    /// Directory holding `common.wgsl` and the per-layer shader files.
    pub shader_dir: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            stars: StarFieldConfig::default(),
            ridge: RidgeConfig::default(),
            camera: CameraConfig::default(),
            layers: LayerSettings::default(),
            shader_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
        }
    }
}

impl SceneConfig {
    /// Defaults, with the shader directory taken from `HORIZON_SHADER_DIR`
    /// when present.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(SHADER_DIR_ENV).filter(|d| !d.is_empty()) {
            config.shader_dir = PathBuf::from(dir);
        }
        log::debug!("shader directory: {}", config.shader_dir.display());
        config
    }
}
