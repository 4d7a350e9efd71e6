//! Maps a tracked hand to servo angles for manual control.
//!
//! The rotating base follows the hand across the working envelope, both arm
//! joints follow its height, and the gripper follows whether the hand is
//! open or closed.

use crate::detection::WorkingEnvelope;
use crate::pose::{MAX_ANGLE, MIN_ANGLE};

/// Detector class of a closed hand.
pub const CLASS_CLOSED_HAND: u32 = 0;
/// Detector class of an open hand.
pub const CLASS_OPEN_HAND: u32 = 1;
/// Classes manual control reacts to.
pub const HAND_CLASSES: [u32; 2] = [CLASS_CLOSED_HAND, CLASS_OPEN_HAND];

/// Gripper angle while the hand is closed.
pub const GRIPPER_CLOSED: i32 = 10;
/// Gripper angle while the hand is open.
pub const GRIPPER_OPEN: i32 = 120;

// Arm joint angles at the top and bottom of the envelope.
const ARM1_TOP: f64 = 170.0;
const ARM1_BOTTOM: f64 = 70.0;
const ARM2_TOP: f64 = 100.0;
const ARM2_BOTTOM: f64 = 170.0;

/// Position of `value` between `lo` and `hi`, clamped to `0.0..=1.0`.
fn fraction(value: i32, lo: i32, hi: i32) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    ((value as f64 - lo as f64) / (hi as f64 - lo as f64)).clamp(0.0, 1.0)
}

fn lerp(from: f64, to: f64, t: f64) -> i32 {
    (from + (to - from) * t).round() as i32
}

/// Rotating base angle for a hand at pixel column `x`. The camera image is
/// mirrored relative to the arm, so the left edge of the envelope maps to
/// 180 and the right edge to 0.
pub fn rotating_base_angle(envelope: &WorkingEnvelope, x: i32) -> i32 {
    let t = fraction(x, envelope.top_left.0, envelope.bottom_right.0);
    lerp(MAX_ANGLE as f64, MIN_ANGLE as f64, t)
}

/// Angles of both arm joints for a hand at pixel row `y`. A higher hand
/// raises the first joint and straightens the second.
pub fn arm_angles(envelope: &WorkingEnvelope, y: i32) -> (i32, i32) {
    let t = fraction(y, envelope.top_left.1, envelope.bottom_right.1);
    (lerp(ARM1_TOP, ARM1_BOTTOM, t), lerp(ARM2_TOP, ARM2_BOTTOM, t))
}

/// Gripper angle for a hand class, or `None` for classes manual control
/// does not know.
pub fn gripper_angle(class: u32) -> Option<i32> {
    match class {
        CLASS_CLOSED_HAND => Some(GRIPPER_CLOSED),
        CLASS_OPEN_HAND => Some(GRIPPER_OPEN),
        _ => None,
    }
}
