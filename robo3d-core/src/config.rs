/// Scene configuration: camera, light, colors and input tuning
use nalgebra::{Point3, Vector3, Vector4};

use crate::geometry::Color;

/// Everything a host may tune about the robot scene.
///
/// `Default` reproduces the classic setup: a 600x400 view looking at the
/// robot from (20, 20, 20) with a point light above and to the right.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Homogeneous world-space light position.
    pub light_position: Vector4<f32>,
    pub ambient: f32,
    pub clear_color: Color,
    /// Color for segments without an override.
    pub default_color: Color,
    /// Degrees added or removed per key press.
    pub key_step_deg: f32,
    /// Degrees of orbit per pixel of mouse drag.
    pub drag_sensitivity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            eye: Point3::new(20.0, 20.0, 20.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov_deg: 60.0,
            aspect: 1.5,
            near: 0.1,
            far: 1000.0,
            light_position: Vector4::new(5.0, 10.0, 5.0, 1.0),
            ambient: 0.3,
            clear_color: [0.9, 0.9, 0.9, 1.0],
            default_color: [0.0, 0.0, 1.0, 1.0],
            key_step_deg: 15.0,
            drag_sensitivity: 0.5,
        }
    }
}

impl SceneConfig {
    pub fn with_aspect(mut self, width: u32, height: u32) -> Self {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self
    }
}
