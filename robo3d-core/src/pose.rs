/// Pose state: per-joint angles and the local transforms derived from them
use nalgebra::{Matrix4, Vector3};
use tracing::debug;

use crate::skeleton::{JointId, Skeleton};

/// Eyebrow expression toggled from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expression {
    #[default]
    Neutral,
    Frown,
}

const FROWN_BROW_HEIGHT: f32 = 1.0;
const FROWN_BROW_TILT: f32 = 5.0;

/// Current degrees of freedom of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointState {
    pub translation: Vector3<f32>,
    /// Accumulated angle in degrees, never wrapped.
    pub angle: f32,
}

/// Root orbit accumulated from mouse drags, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orbit {
    pub yaw: f32,
    pub pitch: f32,
}

/// All mutable state of the robot between frames.
///
/// Written by the input controller, read by the traversal. Every write
/// recomputes the affected joint's local transform from its translation and
/// angle, never by multiplying onto the previous matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    states: [JointState; JointId::COUNT],
    locals: [Matrix4<f32>; JointId::COUNT],
    orbit: Orbit,
    expression: Expression,
}

impl Pose {
    /// Rest pose of `skeleton`.
    pub fn new(skeleton: &Skeleton) -> Self {
        let mut pose = Self {
            states: [JointState {
                translation: Vector3::zeros(),
                angle: 0.0,
            }; JointId::COUNT],
            locals: [Matrix4::identity(); JointId::COUNT],
            orbit: Orbit::default(),
            expression: Expression::Neutral,
        };
        for joint in skeleton.joints() {
            pose.states[joint.id.index()] = JointState {
                translation: joint.rest,
                angle: joint.rest_angle,
            };
            pose.recompute(skeleton, joint.id);
        }
        pose
    }

    pub fn state(&self, id: JointId) -> &JointState {
        &self.states[id.index()]
    }

    pub fn angle(&self, id: JointId) -> f32 {
        self.states[id.index()].angle
    }

    /// Current local transform of `id` relative to its parent.
    pub fn local(&self, id: JointId) -> &Matrix4<f32> {
        &self.locals[id.index()]
    }

    pub fn orbit(&self) -> Orbit {
        self.orbit
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn set_angle(&mut self, skeleton: &Skeleton, id: JointId, angle: f32) {
        self.states[id.index()].angle = angle;
        self.recompute(skeleton, id);
    }

    /// Adds `delta` degrees to the joint's accumulated angle.
    pub fn rotate_joint(&mut self, skeleton: &Skeleton, id: JointId, delta: f32) {
        let angle = self.angle(id) + delta;
        self.set_angle(skeleton, id, angle);
        debug!(joint = ?id, angle, "joint rotated");
    }

    /// Adds to the root orbit and rebuilds the root transform.
    pub fn orbit_by(&mut self, skeleton: &Skeleton, yaw: f32, pitch: f32) {
        self.orbit.yaw += yaw;
        self.orbit.pitch += pitch;
        let root = skeleton.joint(skeleton.root()).id;
        self.recompute(skeleton, root);
    }

    pub fn set_expression(&mut self, skeleton: &Skeleton, expression: Expression) {
        self.expression = expression;
        for id in [JointId::EyebrowR, JointId::EyebrowL] {
            let Some(joint) = skeleton.find(id) else {
                continue;
            };
            let state = &mut self.states[id.index()];
            match expression {
                Expression::Neutral => {
                    state.translation = joint.rest;
                    state.angle = joint.rest_angle;
                }
                Expression::Frown => {
                    state.translation = Vector3::new(joint.rest.x, FROWN_BROW_HEIGHT, joint.rest.z);
                    // Tilt sign follows the brow's side of the face.
                    state.angle = FROWN_BROW_TILT * joint.rest.x.signum();
                }
            }
            self.recompute(skeleton, id);
        }
        debug!(?expression, "expression changed");
    }

    fn recompute(&mut self, skeleton: &Skeleton, id: JointId) {
        let Some(joint) = skeleton.find(id) else {
            return;
        };
        let state = self.states[id.index()];
        self.locals[id.index()] = joint.local_transform(
            &state.translation,
            state.angle,
            (self.orbit.yaw, self.orbit.pitch),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn test_rest_pose_is_translations() {
        let skeleton = Skeleton::robot();
        let pose = Pose::new(&skeleton);
        let expected = Transform::translation(&Vector3::new(3.0, 3.0, 0.0));
        assert!((pose.local(JointId::ShoulderR) - expected).norm() < 1e-6);
        assert!((pose.local(JointId::Torso) - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_eyes_rest_tilted() {
        let skeleton = Skeleton::robot();
        let pose = Pose::new(&skeleton);
        let expected = Transform::translation(&Vector3::new(1.75, 0.0, 1.6))
            * Transform::rotation(-5.0, &Vector3::z());
        assert!((pose.local(JointId::EyeR) - expected).norm() < 1e-6);
        assert_eq!(pose.angle(JointId::EyeL), 5.0);
    }

    #[test]
    fn test_repeated_rotation_has_no_drift() {
        let skeleton = Skeleton::robot();
        let mut stepped = Pose::new(&skeleton);
        for _ in 0..24 {
            stepped.rotate_joint(&skeleton, JointId::ArmR, 15.0);
        }
        let mut direct = Pose::new(&skeleton);
        direct.set_angle(&skeleton, JointId::ArmR, 360.0);

        assert_eq!(stepped.angle(JointId::ArmR), 360.0);
        assert_eq!(stepped.local(JointId::ArmR), direct.local(JointId::ArmR));
    }

    #[test]
    fn test_angles_are_not_wrapped() {
        let skeleton = Skeleton::robot();
        let mut pose = Pose::new(&skeleton);
        for _ in 0..30 {
            pose.rotate_joint(&skeleton, JointId::Head, 15.0);
        }
        assert_eq!(pose.angle(JointId::Head), 450.0);
    }

    #[test]
    fn test_orbit_keeps_torso_angle() {
        let skeleton = Skeleton::robot();
        let mut pose = Pose::new(&skeleton);
        pose.rotate_joint(&skeleton, JointId::Torso, 15.0);
        pose.orbit_by(&skeleton, 10.0, -20.0);

        let expected = Transform::rotation(25.0, &Vector3::y())
            * Transform::rotation(-20.0, &Vector3::x());
        assert!((pose.local(JointId::Torso) - expected).norm() < 1e-6);

        // A later key press rebuilds the root with the pitch still applied.
        pose.rotate_joint(&skeleton, JointId::Torso, -15.0);
        let expected = Transform::rotation(10.0, &Vector3::y())
            * Transform::rotation(-20.0, &Vector3::x());
        assert!((pose.local(JointId::Torso) - expected).norm() < 1e-6);
    }

    #[test]
    fn test_frown_and_back() {
        let skeleton = Skeleton::robot();
        let rest = Pose::new(&skeleton);
        let mut pose = rest.clone();

        pose.set_expression(&skeleton, Expression::Frown);
        let expected = Transform::translation(&Vector3::new(-1.75, 1.0, 1.6))
            * Transform::rotation(-5.0, &Vector3::z());
        assert!((pose.local(JointId::EyebrowR) - expected).norm() < 1e-6);
        let expected = Transform::translation(&Vector3::new(1.75, 1.0, 1.6))
            * Transform::rotation(5.0, &Vector3::z());
        assert!((pose.local(JointId::EyebrowL) - expected).norm() < 1e-6);

        pose.set_expression(&skeleton, Expression::Neutral);
        assert_eq!(pose, rest);
    }
}
