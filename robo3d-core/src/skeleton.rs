/// The robot's fixed joint tree, described as data
use nalgebra::{Matrix4, Vector3};
use tracing::warn;

use crate::geometry::Color;
use crate::transform::Transform;

const PURPLE: Color = [0.6, 0.0, 0.6, 1.0];
const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
const CHARCOAL: Color = [0.1, 0.1, 0.1, 1.0];

/// One rotatable body segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointId {
    Torso,
    ShoulderR,
    ArmR,
    HandR,
    ShoulderL,
    ArmL,
    HandL,
    Head,
    EyeR,
    EyeL,
    EyebrowR,
    EyebrowL,
    ThighR,
    CalfR,
    ThighL,
    CalfL,
}

impl JointId {
    pub const COUNT: usize = 16;

    /// All joints in depth-first traversal order.
    pub const ALL: [JointId; Self::COUNT] = [
        JointId::Torso,
        JointId::ShoulderR,
        JointId::ArmR,
        JointId::HandR,
        JointId::ShoulderL,
        JointId::ArmL,
        JointId::HandL,
        JointId::Head,
        JointId::EyeR,
        JointId::EyeL,
        JointId::EyebrowR,
        JointId::EyebrowL,
        JointId::ThighR,
        JointId::CalfR,
        JointId::ThighL,
        JointId::CalfL,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// How a joint's angle turns into its local transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Articulation {
    /// `T(rest) * R(yaw + angle, Y) * R(pitch, X)`; the root only.
    Orbit,
    /// `T(rest) * R(sign * angle, axis)`.
    Spin { axis: Vector3<f32> },
    /// `T(rest) * T(pivot) * R(sign * angle, axis) * T(-pivot)`.
    Hinge {
        axis: Vector3<f32>,
        pivot: Vector3<f32>,
    },
}

/// Static description of one joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDesc {
    pub id: JointId,
    pub parent: Option<JointId>,
    /// Translation placing the joint relative to its parent at angle 0.
    pub rest: Vector3<f32>,
    /// Angle of the unposed joint, in degrees.
    pub rest_angle: f32,
    /// `-1.0` mirrors the angle for left-side joints.
    pub sign: f32,
    pub articulation: Articulation,
    /// Non-uniform scale turning the unit cube into this segment's box.
    pub shape: Vector3<f32>,
    /// `None` draws with the scene's default color.
    pub color: Option<Color>,
}

impl JointDesc {
    /// Local transform for `angle` degrees placed at `translation`.
    ///
    /// Always rebuilt from scratch so repeated updates never accumulate
    /// rounding drift. `orbit` is `(yaw, pitch)` and only read by the root.
    pub fn local_transform(
        &self,
        translation: &Vector3<f32>,
        angle: f32,
        orbit: (f32, f32),
    ) -> Matrix4<f32> {
        let place = Transform::translation(translation);
        match self.articulation {
            Articulation::Orbit => {
                let (yaw, pitch) = orbit;
                place
                    * Transform::rotation(yaw + angle, &Vector3::y())
                    * Transform::rotation(pitch, &Vector3::x())
            }
            Articulation::Spin { axis } => place * Transform::rotation(self.sign * angle, &axis),
            Articulation::Hinge { axis, pivot } => {
                place * Transform::rotation_about(self.sign * angle, &axis, &pivot)
            }
        }
    }

    pub fn shape_transform(&self) -> Matrix4<f32> {
        Transform::scale(&self.shape)
    }
}

/// The joint tree: descriptors in traversal order plus child lists.
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<JointDesc>,
    children: Vec<Vec<usize>>,
    root: usize,
}

impl Skeleton {
    /// Build from descriptors listed parent-before-child.
    ///
    /// Children keep the order in which they appear in `joints`.
    pub fn new(joints: Vec<JointDesc>) -> Self {
        let mut children = vec![Vec::new(); joints.len()];
        let mut root = 0;
        for (index, joint) in joints.iter().enumerate() {
            match joint.parent {
                Some(parent) => match joints.iter().position(|j| j.id == parent) {
                    Some(p) => children[p].push(index),
                    None => {
                        warn!(joint = ?joint.id, ?parent, "parent not in table, subtree unreachable");
                    }
                },
                None => root = index,
            }
        }
        Self {
            joints,
            children,
            root,
        }
    }

    /// The humanoid robot: torso with arms, head, and legs.
    pub fn robot() -> Self {
        use JointId::*;

        let z = Vector3::z();
        let y = Vector3::y();
        let neg_x = -Vector3::x();
        let shoulder_pivot = Vector3::new(0.0, 2.0, 0.0);
        let arm_pivot = Vector3::new(0.0, 2.5, 1.0);
        let leg_pivot = Vector3::new(0.0, 2.5, 0.0);

        let joint = |id, parent, rest: [f32; 3], articulation, shape: [f32; 3], color| JointDesc {
            id,
            parent,
            rest: Vector3::from(rest),
            rest_angle: 0.0,
            sign: 1.0,
            articulation,
            shape: Vector3::from(shape),
            color,
        };
        let mirrored = |desc: JointDesc| JointDesc { sign: -1.0, ..desc };
        let tilted = |desc: JointDesc, angle| JointDesc {
            rest_angle: angle,
            ..desc
        };

        let shoulder = Articulation::Hinge {
            axis: z,
            pivot: shoulder_pivot,
        };
        let arm = Articulation::Hinge {
            axis: z,
            pivot: arm_pivot,
        };
        let leg = Articulation::Hinge {
            axis: neg_x,
            pivot: leg_pivot,
        };
        let spin_y = Articulation::Spin { axis: y };
        let spin_z = Articulation::Spin { axis: z };

        Self::new(vec![
            joint(Torso, None, [0.0, 0.0, 0.0], Articulation::Orbit, [5.0, 12.0, 3.0], None),
            joint(ShoulderR, Some(Torso), [3.0, 3.0, 0.0], shoulder, [2.0, 5.0, 2.0], None),
            joint(ArmR, Some(ShoulderR), [0.0, -5.0, 0.0], arm, [2.0, 5.0, 2.0], None),
            joint(HandR, Some(ArmR), [0.5, -4.0, 0.0], spin_y, [1.0, 3.0, 3.0], Some(PURPLE)),
            mirrored(joint(ShoulderL, Some(Torso), [-3.0, 3.0, 0.0], shoulder, [2.0, 5.0, 2.0], None)),
            mirrored(joint(ArmL, Some(ShoulderL), [0.0, -5.0, 0.0], arm, [2.0, 5.0, 2.0], None)),
            mirrored(joint(HandL, Some(ArmL), [-0.5, -4.0, 0.0], spin_y, [1.0, 3.0, 3.0], Some(PURPLE))),
            joint(Head, Some(Torso), [0.0, 9.0, 0.0], spin_y, [7.0, 6.0, 4.0], Some(PURPLE)),
            tilted(joint(EyeR, Some(Head), [1.75, 0.0, 1.6], spin_z, [1.0, 2.0, 1.0], Some(BLACK)), -5.0),
            tilted(joint(EyeL, Some(Head), [-1.75, 0.0, 1.6], spin_z, [1.0, 2.0, 1.0], Some(BLACK)), 5.0),
            joint(EyebrowR, Some(Head), [-1.75, 1.6, 1.6], spin_z, [1.5, 0.4, 1.0], Some(CHARCOAL)),
            joint(EyebrowL, Some(Head), [1.75, 1.6, 1.6], spin_z, [1.5, 0.4, 1.0], Some(CHARCOAL)),
            joint(ThighR, Some(Torso), [1.75, -8.5, 0.0], leg, [1.0, 5.0, 1.0], None),
            joint(CalfR, Some(ThighR), [0.0, -5.0, 0.0], leg, [1.0, 5.0, 1.0], None),
            joint(ThighL, Some(Torso), [-1.75, -8.5, 0.0], leg, [1.0, 5.0, 1.0], None),
            joint(CalfL, Some(ThighL), [0.0, -5.0, 0.0], leg, [1.0, 5.0, 1.0], None),
        ])
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn joint(&self, index: usize) -> &JointDesc {
        &self.joints[index]
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    pub fn find(&self, id: JointId) -> Option<&JointDesc> {
        self.joints.iter().find(|j| j.id == id)
    }

    pub fn joints(&self) -> &[JointDesc] {
        &self.joints
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::robot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_has_every_joint_once() {
        let skeleton = Skeleton::robot();
        assert_eq!(skeleton.len(), JointId::COUNT);
        for id in JointId::ALL {
            assert_eq!(skeleton.joints().iter().filter(|j| j.id == id).count(), 1);
        }
    }

    #[test]
    fn test_table_order_matches_joint_index() {
        let skeleton = Skeleton::robot();
        for (index, joint) in skeleton.joints().iter().enumerate() {
            assert_eq!(joint.id.index(), index);
        }
    }

    #[test]
    fn test_tree_shape() {
        let skeleton = Skeleton::robot();
        assert_eq!(skeleton.joint(skeleton.root()).id, JointId::Torso);

        let ids = |index| -> Vec<JointId> {
            skeleton
                .children(index)
                .iter()
                .map(|&c| skeleton.joint(c).id)
                .collect()
        };
        assert_eq!(
            ids(JointId::Torso.index()),
            vec![
                JointId::ShoulderR,
                JointId::ShoulderL,
                JointId::Head,
                JointId::ThighR,
                JointId::ThighL
            ]
        );
        assert_eq!(
            ids(JointId::Head.index()),
            vec![JointId::EyeR, JointId::EyeL, JointId::EyebrowR, JointId::EyebrowL]
        );
        assert!(ids(JointId::HandL.index()).is_empty());
    }

    #[test]
    fn test_orphan_joint_is_left_out() {
        let joints: Vec<JointDesc> = Skeleton::robot()
            .joints()
            .iter()
            .filter(|j| j.id != JointId::ShoulderR)
            .cloned()
            .collect();
        let skeleton = Skeleton::new(joints);
        assert_eq!(skeleton.len(), JointId::COUNT - 1);

        let arm = skeleton
            .joints()
            .iter()
            .position(|j| j.id == JointId::ArmR)
            .unwrap();
        for index in 0..skeleton.len() {
            assert!(!skeleton.children(index).contains(&arm));
        }
        // The hand still hangs off the orphaned arm.
        assert_eq!(skeleton.children(arm).len(), 1);
    }

    #[test]
    fn test_hinge_rest_is_plain_translation() {
        let skeleton = Skeleton::robot();
        let arm = skeleton.find(JointId::ArmR).unwrap();
        let local = arm.local_transform(&arm.rest, 0.0, (0.0, 0.0));
        assert!((local - Transform::translation(&arm.rest)).norm() < 1e-6);
    }
}
