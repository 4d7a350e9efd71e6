//! Inverse kinematics for the two arm links.
//!
//! Points are given in centimeters in the plane of the arm, with the origin
//! at the shoulder axis, `x` pointing forward and `y` pointing up. Angles are
//! returned in degrees: the shoulder angle is measured from the `x` axis and
//! the elbow angle is the bend of the second link relative to the first.

use std::{error::Error, fmt};

/// Length of the first link (shoulder to elbow), in centimeters.
pub const UPPER_LINK_CM: f64 = 10.5;
/// Length of the second link (elbow to gripper), in centimeters.
pub const LOWER_LINK_CM: f64 = 12.5;

/// Returned when a target point lies outside the annulus the two links can
/// reach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnreachableTarget {
    /// Requested `x`, in centimeters.
    pub x: f64,
    /// Requested `y`, in centimeters.
    pub y: f64,
}

impl fmt::Display for UnreachableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target ({:.2}, {:.2}) cm is out of reach", self.x, self.y)
    }
}

impl Error for UnreachableTarget {}

/// Shoulder and elbow angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    /// Angle of the first link from the `x` axis.
    pub shoulder: f64,
    /// Bend of the second link relative to the first.
    pub elbow: f64,
}

/// A planar arm made of two rigid links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoLinkArm {
    upper: f64,
    lower: f64,
}

impl Default for TwoLinkArm {
    fn default() -> Self {
        Self::new(UPPER_LINK_CM, LOWER_LINK_CM)
    }
}

impl TwoLinkArm {
    /// Builds an arm from its two link lengths.
    pub fn new(upper: f64, lower: f64) -> Self {
        Self { upper, lower }
    }

    /// Farthest reachable distance from the shoulder.
    pub fn max_reach(&self) -> f64 {
        self.upper + self.lower
    }

    /// Closest reachable distance from the shoulder.
    pub fn min_reach(&self) -> f64 {
        (self.upper - self.lower).abs()
    }

    /// Solves for the joint angles that put the end of the second link on
    /// `(x, y)`, using the law of cosines.
    pub fn solve(&self, x: f64, y: f64) -> Result<JointAngles, UnreachableTarget> {
        let unreachable = UnreachableTarget { x, y };
        if !x.is_finite() || !y.is_finite() {
            return Err(unreachable);
        }

        let dist_sq = x * x + y * y;
        let dist = dist_sq.sqrt();
        if dist > self.max_reach() || dist < self.min_reach() {
            return Err(unreachable);
        }

        let cos_elbow = (dist_sq - self.upper.powi(2) - self.lower.powi(2))
            / (2.0 * self.upper * self.lower);
        // Rounding can push a boundary point a hair past +-1.
        let elbow = cos_elbow.clamp(-1.0, 1.0).acos();
        let shoulder =
            y.atan2(x) - (self.lower * elbow.sin()).atan2(self.upper + self.lower * elbow.cos());

        Ok(JointAngles {
            shoulder: shoulder.to_degrees(),
            elbow: elbow.to_degrees(),
        })
    }

    /// Where the end of the second link sits for the given joint angles.
    pub fn forward(&self, angles: JointAngles) -> (f64, f64) {
        let shoulder = angles.shoulder.to_radians();
        let total = shoulder + angles.elbow.to_radians();
        (
            self.upper * shoulder.cos() + self.lower * total.cos(),
            self.upper * shoulder.sin() + self.lower * total.sin(),
        )
    }
}

/// Solves with the default link lengths of the arm.
pub fn solve_point(x: f64, y: f64) -> Result<JointAngles, UnreachableTarget> {
    TwoLinkArm::default().solve(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn solution_reaches_the_target() {
        let arm = TwoLinkArm::default();
        for &(x, y) in &[(10.0, 15.0), (20.0, 0.0), (5.0, -8.0), (0.0, 22.0)] {
            let angles = arm.solve(x, y).unwrap();
            let (fx, fy) = arm.forward(angles);
            assert!(close(fx, x) && close(fy, y), "({x}, {y}) -> ({fx}, {fy})");
        }
    }

    #[test]
    fn fully_stretched_arm_has_no_bend() {
        let arm = TwoLinkArm::default();
        let angles = arm.solve(arm.max_reach(), 0.0).unwrap();
        assert!(close(angles.elbow, 0.0));
        assert!(close(angles.shoulder, 0.0));
    }

    #[test]
    fn too_far_is_unreachable() {
        assert_eq!(
            solve_point(30.0, 0.0),
            Err(UnreachableTarget { x: 30.0, y: 0.0 })
        );
    }

    #[test]
    fn too_close_is_unreachable() {
        assert!(solve_point(1.0, 0.0).is_err());
    }

    #[test]
    fn non_finite_is_unreachable() {
        assert!(solve_point(f64::NAN, 3.0).is_err());
        assert!(solve_point(f64::INFINITY, 3.0).is_err());
    }

    #[test]
    fn angles_are_finite_for_reachable_points() {
        let angles = solve_point(10.0, 15.0).unwrap();
        assert!(angles.shoulder.is_finite());
        assert!((0.0..=180.0).contains(&angles.elbow));
    }
}
