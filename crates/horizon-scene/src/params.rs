//! Named shader parameters and their packed uniform layout.
//!
//! Layers describe their inputs by name (`view`, `projection`, `cameraPos`, ...)
//! the way a classic uniform interface would. The GPU backend packs them into
//! [`LayerUniforms`], which mirrors `Globals` in `shaders/common.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub const VIEW: &str = "view";
pub const PROJECTION: &str = "projection";
pub const CAMERA_POS: &str = "cameraPos";
pub const TIME: &str = "time";
pub const SCALE_FACTOR: &str = "scaleFactor";
pub const TRANSLATION: &str = "translation";

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Float(f32),
}

/// Ordered set of named parameters for one draw. Setting a name twice replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderParams {
    values: Vec<(&'static str, ParamValue)>,
}

impl ShaderParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mat4(&mut self, name: &'static str, value: Mat4) {
        self.set(name, ParamValue::Mat4(value));
    }

    pub fn set_vec3(&mut self, name: &'static str, value: Vec3) {
        self.set(name, ParamValue::Vec3(value));
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.set(name, ParamValue::Float(value));
    }

    fn set(&mut self, name: &'static str, value: ParamValue) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ParamValue)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Uniform block shared by every layer shader. 160 bytes, std140-compatible.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LayerUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time: f32,
    pub translation: [f32; 3],
    pub scale_factor: f32,
}

impl LayerUniforms {
    /// Packs `params` by name. Parameters that match no field, or match a
    /// field of another type, are returned so the caller can report them.
    pub fn pack(params: &ShaderParams) -> (Self, Vec<&'static str>) {
        let mut u = Self::zeroed();
        let mut rejected = Vec::new();

        for (name, value) in params.iter() {
            match (name, value) {
                (VIEW, ParamValue::Mat4(m)) => u.view = m.to_cols_array_2d(),
                (PROJECTION, ParamValue::Mat4(m)) => u.projection = m.to_cols_array_2d(),
                (CAMERA_POS, ParamValue::Vec3(v)) => u.camera_pos = v.to_array(),
                (TRANSLATION, ParamValue::Vec3(v)) => u.translation = v.to_array(),
                (TIME, ParamValue::Float(f)) => u.time = f,
                (SCALE_FACTOR, ParamValue::Float(f)) => u.scale_factor = f,
                _ => rejected.push(name),
            }
        }

        (u, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<LayerUniforms>(), 160);
        assert_eq!(std::mem::offset_of!(LayerUniforms, camera_pos), 128);
        assert_eq!(std::mem::offset_of!(LayerUniforms, time), 140);
        assert_eq!(std::mem::offset_of!(LayerUniforms, translation), 144);
        assert_eq!(std::mem::offset_of!(LayerUniforms, scale_factor), 156);
    }

    #[test]
    fn setting_twice_replaces_in_place() {
        let mut p = ShaderParams::new();
        p.set_float(TIME, 1.0);
        p.set_vec3(CAMERA_POS, Vec3::ONE);
        p.set_float(TIME, 2.0);

        assert_eq!(p.len(), 2);
        assert_eq!(p.get(TIME), Some(ParamValue::Float(2.0)));
        assert_eq!(p.iter().next().map(|(n, _)| n), Some(TIME));
    }

    #[test]
    fn pack_fills_named_fields() {
        let mut p = ShaderParams::new();
        p.set_mat4(VIEW, Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        p.set_vec3(TRANSLATION, Vec3::new(0.0, 5.0, -100.0));
        p.set_float(SCALE_FACTOR, 12.0);

        let (u, rejected) = LayerUniforms::pack(&p);
        assert!(rejected.is_empty());
        assert_eq!(u.view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.translation, [0.0, 5.0, -100.0]);
        assert_eq!(u.scale_factor, 12.0);
        assert_eq!(u.projection, [[0.0; 4]; 4]);
    }

    #[test]
    fn pack_rejects_unknown_and_mistyped_names() {
        let mut p = ShaderParams::new();
        p.set_float("exposure", 1.0);
        p.set_float(VIEW, 3.0);

        let (u, rejected) = LayerUniforms::pack(&p);
        assert_eq!(rejected, vec!["exposure", VIEW]);
        assert_eq!(u.view, [[0.0; 4]; 4]);
    }
}
