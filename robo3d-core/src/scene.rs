/// Scene: the robot, its pose, the camera and the per-frame entry point
use tracing::info;

use crate::config::SceneConfig;
use crate::input::{InputController, InputEvent};
use crate::pose::Pose;
use crate::projection::Camera;
use crate::render::{self, FrameStats, FrameUniforms, RenderBackend};
use crate::skeleton::Skeleton;

/// Everything needed to render the robot, minus the device.
///
/// Hosts own the clock: they forward input with [`Scene::handle`] and call
/// [`Scene::render_frame`] once per tick. Both take `&mut self`, so a frame
/// never observes a half-applied input event.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    skeleton: Skeleton,
    pose: Pose,
    input: InputController,
    camera: Camera,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let skeleton = Skeleton::robot();
        let pose = Pose::new(&skeleton);
        let input = InputController::new(config.key_step_deg, config.drag_sensitivity);
        let camera = Camera::from_config(&config);
        info!(joints = skeleton.len(), "scene ready");
        Self {
            config,
            skeleton,
            pose,
            input,
            camera,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_dragging(&self) -> bool {
        self.input.is_dragging()
    }

    /// Follow a resized drawing surface.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Apply one input event. Returns whether the pose changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        self.input.handle(event, &self.skeleton, &mut self.pose)
    }

    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            light_position: self.config.light_position,
            ambient: self.config.ambient,
            clear_color: self.config.clear_color,
        }
    }

    /// Render one frame into `backend`.
    pub fn render_frame<B: RenderBackend>(&self, backend: &mut B) -> FrameStats {
        render::render_frame(
            &self.skeleton,
            &self.pose,
            &self.frame_uniforms(),
            self.config.default_color,
            backend,
        )
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;

    #[test]
    fn test_config_reaches_input() {
        let config = SceneConfig {
            key_step_deg: 30.0,
            ..SceneConfig::default()
        };
        let mut scene = Scene::new(config);
        scene.handle(InputEvent::Key('l'));
        assert_eq!(scene.pose().angle(crate::skeleton::JointId::Head), 30.0);
    }

    #[test]
    fn test_viewport_changes_projection_only() {
        let mut scene = Scene::default();
        let before = scene.frame_uniforms();
        scene.set_viewport(800, 400);
        let after = scene.frame_uniforms();
        assert_eq!(before.view, after.view);
        assert_ne!(before.projection, after.projection);
    }

    #[test]
    fn test_frame_uses_clear_color() {
        let scene = Scene::default();
        let mut backend = RecordingBackend::new();
        scene.render_frame(&mut backend);
        assert_eq!(backend.frames[0].clear_color, [0.9, 0.9, 0.9, 1.0]);
    }
}
