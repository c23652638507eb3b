/// Input controller: turns key presses and mouse drags into pose changes
use tracing::trace;

use crate::pose::{Expression, Pose};
use crate::skeleton::{JointId, Skeleton};

/// Host-independent input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A printable key; case selects the rotation direction.
    Key(char),
    /// Primary button pressed at a pointer position.
    MouseDown { x: f32, y: f32 },
    MouseUp,
    MouseMove { x: f32, y: f32 },
}

/// What a key does to the pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// Add `steps` key steps to every listed joint.
    Rotate {
        joints: &'static [JointId],
        steps: f32,
    },
    Expression(Expression),
}

const TORSO: &[JointId] = &[JointId::Torso];
const SHOULDERS: &[JointId] = &[JointId::ShoulderR, JointId::ShoulderL];
const ARMS: &[JointId] = &[JointId::ArmR, JointId::ArmL];
const HANDS: &[JointId] = &[JointId::HandR, JointId::HandL];
const HEAD: &[JointId] = &[JointId::Head];
const THIGHS: &[JointId] = &[JointId::ThighR, JointId::ThighL];
const CALVES: &[JointId] = &[JointId::CalfR, JointId::CalfL];

/// Key binding table. Lowercase and uppercase of a letter move the same
/// joints in opposite directions.
pub fn key_action(key: char) -> Option<KeyAction> {
    let forward = key.is_ascii_lowercase();
    let direction = if forward { 1.0 } else { -1.0 };
    let rotate = |joints, sign: f32| KeyAction::Rotate {
        joints,
        steps: sign * direction,
    };

    let action = match key.to_ascii_lowercase() {
        't' => rotate(TORSO, 1.0),
        's' => rotate(SHOULDERS, 1.0),
        'a' => rotate(ARMS, 1.0),
        'h' => rotate(HANDS, 1.0),
        'l' => rotate(HEAD, 1.0),
        'y' => rotate(THIGHS, 1.0),
        // Calves bend backwards on the lowercase key.
        'u' => rotate(CALVES, -1.0),
        'm' if forward => KeyAction::Expression(Expression::Frown),
        'm' => KeyAction::Expression(Expression::Neutral),
        _ => return None,
    };
    Some(action)
}

/// Tracks the drag gesture and applies events to a [`Pose`].
#[derive(Debug, Clone)]
pub struct InputController {
    /// Degrees per key press.
    pub step: f32,
    /// Degrees of orbit per pixel dragged.
    pub sensitivity: f32,
    drag: Option<(f32, f32)>,
}

impl InputController {
    pub fn new(step: f32, sensitivity: f32) -> Self {
        Self {
            step,
            sensitivity,
            drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Apply one event. Returns whether the pose changed.
    pub fn handle(&mut self, event: InputEvent, skeleton: &Skeleton, pose: &mut Pose) -> bool {
        match event {
            InputEvent::Key(key) => self.key_press(key, skeleton, pose),
            InputEvent::MouseDown { x, y } => {
                self.drag = Some((x, y));
                false
            }
            InputEvent::MouseUp => {
                self.drag = None;
                false
            }
            InputEvent::MouseMove { x, y } => self.mouse_move(x, y, skeleton, pose),
        }
    }

    fn key_press(&self, key: char, skeleton: &Skeleton, pose: &mut Pose) -> bool {
        let Some(action) = key_action(key) else {
            trace!(?key, "unbound key ignored");
            return false;
        };
        match action {
            KeyAction::Rotate { joints, steps } => {
                for &joint in joints {
                    pose.rotate_joint(skeleton, joint, steps * self.step);
                }
            }
            KeyAction::Expression(expression) => pose.set_expression(skeleton, expression),
        }
        true
    }

    fn mouse_move(&mut self, x: f32, y: f32, skeleton: &Skeleton, pose: &mut Pose) -> bool {
        let Some((last_x, last_y)) = self.drag else {
            return false;
        };
        self.drag = Some((x, y));

        let dx = x - last_x;
        let dy = y - last_y;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        // Screen y grows downwards; dragging up tilts the robot back.
        pose.orbit_by(skeleton, dx * self.sensitivity, -dy * self.sensitivity);
        true
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(15.0, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Skeleton, Pose, InputController) {
        let skeleton = Skeleton::robot();
        let pose = Pose::new(&skeleton);
        (skeleton, pose, InputController::default())
    }

    #[test]
    fn test_case_selects_direction() {
        assert_eq!(
            key_action('s'),
            Some(KeyAction::Rotate {
                joints: SHOULDERS,
                steps: 1.0
            })
        );
        assert_eq!(
            key_action('S'),
            Some(KeyAction::Rotate {
                joints: SHOULDERS,
                steps: -1.0
            })
        );
        assert_eq!(
            key_action('u'),
            Some(KeyAction::Rotate {
                joints: CALVES,
                steps: -1.0
            })
        );
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let (skeleton, mut pose, mut input) = setup();
        let before = pose.clone();
        for key in ['q', 'Z', '1', ' ', 'é'] {
            assert!(!input.handle(InputEvent::Key(key), &skeleton, &mut pose));
        }
        assert_eq!(pose, before);
    }

    #[test]
    fn test_pair_moves_together() {
        let (skeleton, mut pose, mut input) = setup();
        input.handle(InputEvent::Key('y'), &skeleton, &mut pose);
        assert_eq!(pose.angle(JointId::ThighR), 15.0);
        assert_eq!(pose.angle(JointId::ThighL), 15.0);

        input.handle(InputEvent::Key('u'), &skeleton, &mut pose);
        assert_eq!(pose.angle(JointId::CalfR), -15.0);
        assert_eq!(pose.angle(JointId::CalfL), -15.0);
    }

    #[test]
    fn test_brow_keys() {
        let (skeleton, mut pose, mut input) = setup();
        input.handle(InputEvent::Key('m'), &skeleton, &mut pose);
        assert_eq!(pose.expression(), Expression::Frown);
        input.handle(InputEvent::Key('M'), &skeleton, &mut pose);
        assert_eq!(pose.expression(), Expression::Neutral);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let (skeleton, mut pose, mut input) = setup();
        assert!(!input.handle(InputEvent::MouseMove { x: 10.0, y: 10.0 }, &skeleton, &mut pose));
        assert_eq!(pose.orbit().yaw, 0.0);
    }

    #[test]
    fn test_drag_accumulates_deltas() {
        let (skeleton, mut pose, mut input) = setup();
        input.handle(InputEvent::MouseDown { x: 0.0, y: 0.0 }, &skeleton, &mut pose);
        input.handle(InputEvent::MouseMove { x: 10.0, y: 0.0 }, &skeleton, &mut pose);
        input.handle(InputEvent::MouseMove { x: 30.0, y: 4.0 }, &skeleton, &mut pose);
        assert_eq!(pose.orbit().yaw, 15.0);
        assert_eq!(pose.orbit().pitch, -2.0);

        input.handle(InputEvent::MouseMove { x: 20.0, y: 4.0 }, &skeleton, &mut pose);
        assert_eq!(pose.orbit().yaw, 10.0);
    }
}
