/// Robo3D Core Library - hierarchical robot model and scene traversal
///
/// This library holds everything that does not depend on a display: the
/// shared cube mesh, the transform stack, the robot's joint tree and pose,
/// the input controller and the per-frame traversal that feeds a
/// [`RenderBackend`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod pose;
pub mod projection;
pub mod render;
pub mod scene;
pub mod skeleton;
pub mod stack;
pub mod transform;

// Re-export commonly used types
pub use config::SceneConfig;
pub use error::{DrawError, SetupError};
pub use geometry::{Color, CubeMesh, Triangle, Vertex, CUBE_VERTEX_COUNT};
pub use input::{InputController, InputEvent};
pub use pose::{Expression, Pose};
pub use projection::Camera;
pub use render::{DrawCall, FrameStats, FrameUniforms, RecordingBackend, RenderBackend};
pub use scene::Scene;
pub use skeleton::{JointId, Skeleton};
pub use stack::TransformStack;
pub use transform::Transform;
