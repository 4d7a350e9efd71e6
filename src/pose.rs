//! The [`ArmPose`], a full set of servo angles for the arm.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest angle any servo may be commanded to, in degrees.
pub const MIN_ANGLE: i32 = 0;
/// Largest angle any servo may be commanded to, in degrees.
pub const MAX_ANGLE: i32 = 180;

/// Clamps an angle into the servo range and narrows it to a byte.
pub fn clamp_angle(angle: i32) -> u8 {
    angle.clamp(MIN_ANGLE, MAX_ANGLE) as u8
}

/// Rounds and clamps a floating point angle. NaN lands on [`MIN_ANGLE`].
pub fn clamp_angle_f64(angle: f64) -> u8 {
    if angle.is_nan() {
        return MIN_ANGLE as u8;
    }
    angle.round().clamp(MIN_ANGLE as f64, MAX_ANGLE as f64) as u8
}

/// The last commanded physical pose of the arm. Every field is always in
/// `[0, 180]`; the only way to build one from unchecked numbers is through
/// [`ArmPose::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmPose {
    rotating_base: u8,
    gripper: u8,
    arm1: u8,
    arm2: u8,
}

impl ArmPose {
    /// Upright pose with the gripper closed.
    pub const REST: ArmPose = ArmPose {
        rotating_base: 90,
        gripper: 10,
        arm1: 90,
        arm2: 90,
    };

    /// Builds a pose, clamping every angle into `[0, 180]`.
    pub fn clamped(rotating_base: i32, gripper: i32, arm1: i32, arm2: i32) -> Self {
        Self {
            rotating_base: clamp_angle(rotating_base),
            gripper: clamp_angle(gripper),
            arm1: clamp_angle(arm1),
            arm2: clamp_angle(arm2),
        }
    }

    /// Angle of the rotating base.
    pub fn rotating_base(&self) -> u8 {
        self.rotating_base
    }

    /// Angle of the gripper; small is closed.
    pub fn gripper(&self) -> u8 {
        self.gripper
    }

    /// Angle of the first (shoulder) joint.
    pub fn arm1(&self) -> u8 {
        self.arm1
    }

    /// Angle of the second (elbow) joint.
    pub fn arm2(&self) -> u8 {
        self.arm2
    }

    /// The same pose with only the gripper replaced.
    pub fn with_gripper(self, gripper: i32) -> Self {
        Self {
            gripper: clamp_angle(gripper),
            ..self
        }
    }

    /// Angles in wire order: rotating base, gripper, arm 1, arm 2.
    pub fn angles(&self) -> [u8; 4] {
        [self.rotating_base, self.gripper, self.arm1, self.arm2]
    }
}

impl Default for ArmPose {
    fn default() -> Self {
        Self::REST
    }
}

impl fmt::Display for ArmPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.rotating_base, self.gripper, self.arm1, self.arm2
        )
    }
}
