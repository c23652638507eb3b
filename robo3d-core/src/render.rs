/// Scene traversal: walks the joint tree and issues one cube draw per joint
use nalgebra::{Matrix3, Matrix4, Vector4};
use tracing::warn;

use crate::error::DrawError;
use crate::geometry::Color;
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::stack::TransformStack;
use crate::transform::Transform;

/// Uniforms shared by every draw call of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub light_position: Vector4<f32>,
    pub ambient: f32,
    pub clear_color: Color,
}

/// Parameters of one cube draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Composed ancestors times the segment's shape scale.
    pub model: Matrix4<f32>,
    pub normal_matrix: Matrix3<f32>,
    pub color: Color,
}

/// The device that rasterizes the shared cube mesh.
pub trait RenderBackend {
    /// Clear color and depth and latch the frame uniforms.
    fn begin_frame(&mut self, frame: &FrameUniforms);

    /// Draw the 36-vertex cube with the given transform and color.
    fn draw_cube(&mut self, call: &DrawCall) -> Result<(), DrawError>;
}

/// Bookkeeping of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub pushes: usize,
    pub pops: usize,
    pub draws: usize,
    pub skipped: usize,
}

impl FrameStats {
    /// Every push was matched by a pop.
    pub fn is_balanced(&self) -> bool {
        self.pushes == self.pops
    }
}

struct Traversal<'a, B: RenderBackend> {
    skeleton: &'a Skeleton,
    pose: &'a Pose,
    frame: &'a FrameUniforms,
    default_color: Color,
    backend: &'a mut B,
    stack: TransformStack,
    stats: FrameStats,
}

impl<B: RenderBackend> Traversal<'_, B> {
    fn visit(&mut self, index: usize) {
        let (skeleton, pose) = (self.skeleton, self.pose);
        let joint = skeleton.joint(index);
        let local = pose.local(joint.id);

        let composed = match joint.parent {
            None => *local,
            Some(_) => match self.stack.top() {
                Some(parent) => parent * local,
                None => {
                    warn!(joint = ?joint.id, "no parent transform, subtree skipped");
                    return;
                }
            },
        };

        self.stack.push(composed);
        self.draw(&joint.shape_transform(), joint.color.unwrap_or(self.default_color));
        for &child in skeleton.children(index) {
            self.visit(child);
        }
        self.stack.pop();
    }

    fn draw(&mut self, shape: &Matrix4<f32>, color: Color) {
        let Some(top) = self.stack.top() else {
            self.stats.skipped += 1;
            return;
        };
        let model = top * shape;

        let call = match Transform::normal_matrix(&model, &self.frame.view) {
            Some(normal_matrix) => DrawCall {
                model,
                normal_matrix,
                color,
            },
            None => {
                warn!("{}", DrawError::SingularNormalMatrix);
                self.stats.skipped += 1;
                return;
            }
        };

        match self.backend.draw_cube(&call) {
            Ok(()) => self.stats.draws += 1,
            Err(e) => {
                warn!("draw skipped: {}", e);
                self.stats.skipped += 1;
            }
        }
    }
}

/// Produce one frame: clear, then a depth-first walk of `skeleton` in
/// table order, composing each joint with its parent on the stack.
///
/// Nothing is cached between calls; identical inputs give identical draws.
pub fn render_frame<B: RenderBackend>(
    skeleton: &Skeleton,
    pose: &Pose,
    frame: &FrameUniforms,
    default_color: Color,
    backend: &mut B,
) -> FrameStats {
    backend.begin_frame(frame);

    let mut traversal = Traversal {
        skeleton,
        pose,
        frame,
        default_color,
        backend,
        stack: TransformStack::new(),
        stats: FrameStats::default(),
    };
    if !skeleton.is_empty() {
        traversal.visit(skeleton.root());
    }

    if !traversal.stack.is_empty() {
        warn!(depth = traversal.stack.depth(), "pops do not match pushes");
    }

    FrameStats {
        pushes: traversal.stack.pushes(),
        pops: traversal.stack.pops(),
        ..traversal.stats
    }
}

/// Backend that keeps every call in memory. Handy for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub frames: Vec<FrameUniforms>,
    pub calls: Vec<DrawCall>,
    /// Indices of calls to reject with [`DrawError::MissingUniform`].
    pub reject: Vec<usize>,
    attempts: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.frames.push(frame.clone());
    }

    fn draw_cube(&mut self, call: &DrawCall) -> Result<(), DrawError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.reject.contains(&attempt) {
            return Err(DrawError::MissingUniform("model"));
        }
        self.calls.push(call.clone());
        Ok(())
    }
}
