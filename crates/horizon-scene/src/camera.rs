//! Free-fly camera: yaw/pitch look, planar strafing, zoom by field of view.

use glam::{Mat4, Vec3};

const PITCH_LIMIT_DEG: f32 = 89.0;
const FOV_MIN_DEG: f32 = 1.0;
const FOV_MAX_DEG: f32 = 90.0;

/// Camera tuning. Angles are in degrees.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub fov_deg: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per raw mouse count.
    pub sensitivity: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            // Looking down -Z, towards the sun.
            yaw_deg: -90.0,
            pitch_deg: 0.0,
            fov_deg: 45.0,
            speed: 5.0,
            sensitivity: 0.1,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vec3,
    yaw_deg: f32,
    pitch_deg: f32,
    fov_deg: f32,
    speed: f32,
    sensitivity: f32,
    near: f32,
    far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl FlyCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: config.position,
            yaw_deg: config.yaw_deg,
            pitch_deg: config.pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            fov_deg: config.fov_deg.clamp(FOV_MIN_DEG, FOV_MAX_DEG),
            speed: config.speed,
            sensitivity: config.sensitivity,
            near: config.near,
            far: config.far,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    #[inline]
    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    #[inline]
    pub fn pitch_deg(&self) -> f32 {
        self.pitch_deg
    }

    /// Unit view direction.
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw_deg.to_radians(), self.pitch_deg.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    /// Moves `speed * dt` units along the view direction or the strafe axis.
    pub fn move_in(&mut self, direction: Direction, dt: f32) {
        let distance = self.speed * dt;
        let offset = match direction {
            Direction::Forward => self.front(),
            Direction::Back => -self.front(),
            Direction::Left => -self.right(),
            Direction::Right => self.right(),
        };
        self.position += offset * distance;
    }

    /// Applies a look delta. Positive `dy` looks up.
    pub fn process_look_delta(&mut self, dx: f32, dy: f32) {
        self.yaw_deg += dx * self.sensitivity;
        self.pitch_deg =
            (self.pitch_deg + dy * self.sensitivity).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    /// Narrows or widens the field of view by `delta` degrees.
    pub fn adjust_fov(&mut self, delta: f32) {
        self.fov_deg = (self.fov_deg + delta).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.front(), Vec3::Y)
    }

    /// Perspective projection with wgpu depth range `[0, 1]`.
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    // ── orientation ───────────────────────────────────────────────────────

    #[test]
    fn default_looks_down_negative_z() {
        let cam = FlyCamera::default();
        assert!(approx(cam.front(), Vec3::NEG_Z));
        assert!(approx(cam.right(), Vec3::X));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.process_look_delta(0.0, 10_000.0);
        assert_eq!(cam.pitch_deg(), 89.0);
        cam.process_look_delta(0.0, -100_000.0);
        assert_eq!(cam.pitch_deg(), -89.0);
        assert!(cam.front().is_finite());
    }

    #[test]
    fn look_delta_scales_by_sensitivity() {
        let mut cam = FlyCamera::default();
        cam.process_look_delta(10.0, 5.0);
        assert!((cam.yaw_deg() - (-89.0)).abs() < EPS);
        assert!((cam.pitch_deg() - 0.5).abs() < EPS);
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn movement_is_speed_times_dt() {
        let mut cam = FlyCamera::default();
        cam.move_in(Direction::Forward, 0.5);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -2.5)));
        cam.move_in(Direction::Back, 0.5);
        assert!(approx(cam.position(), Vec3::ZERO));
        cam.move_in(Direction::Right, 1.0);
        assert!(approx(cam.position(), Vec3::new(5.0, 0.0, 0.0)));
        cam.move_in(Direction::Left, 2.0);
        assert!(approx(cam.position(), Vec3::new(-5.0, 0.0, 0.0)));
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut cam = FlyCamera::default();
        cam.move_in(Direction::Forward, 0.0);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn fov_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.adjust_fov(-100.0);
        assert_eq!(cam.fov_deg(), 1.0);
        cam.adjust_fov(500.0);
        assert_eq!(cam.fov_deg(), 90.0);
    }

    #[test]
    fn zero_sized_viewport_projection_is_finite() {
        let cam = FlyCamera::default();
        assert!(cam.projection_matrix(0, 0).is_finite());
        assert!(cam.projection_matrix(1600, 0).is_finite());
    }

    #[test]
    fn view_moves_world_opposite_to_camera() {
        let mut cam = FlyCamera::default();
        cam.move_in(Direction::Right, 1.0);
        let p = cam.view_matrix().transform_point3(Vec3::new(5.0, 0.0, -1.0));
        assert!(approx(p, Vec3::new(0.0, 0.0, -1.0)));
    }
}
