/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::SceneConfig;

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(&SceneConfig::default().with_aspect(width, height))
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            position: config.eye,
            target: config.target,
            up: config.up,
            fov: config.fov_deg.to_radians(),
            aspect: config.aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

/// Project a model-space point to screen space through a full MVP matrix.
///
/// Returns `(x, y, depth)` with depth in normalized device units, or `None`
/// when the point is behind the eye or outside the view volume.
pub fn project_to_screen(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();

    // Points at or behind the eye plane cannot be divided through.
    if clip.w <= 1e-6 {
        return None;
    }

    let ndc = clip.xyz() / clip.w;

    if ndc.z < -1.0 || ndc.z > 1.0 {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc.z))
}
