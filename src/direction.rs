//! Direction of hand motion between frames, with a pixel threshold so that
//! detector jitter does not read as movement.

use crate::detection::Pixel;
use std::fmt;

/// Default minimum displacement, in pixels, before an axis counts as moving.
pub const PIXEL_THRESHOLD: i32 = 5;

/// The nine motion labels.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Still,
    Left,
    Right,
    Up,
    Down,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl Direction {
    /// Classifies the motion from `previous` to `current`. An axis moves when
    /// its displacement is at least `threshold`. Pixel `y` grows downward,
    /// so a shrinking `y` is `Up`.
    pub fn classify(threshold: i32, current: Pixel, previous: Pixel) -> Self {
        let horizontal = axis_step(threshold, current.0, previous.0);
        let vertical = axis_step(threshold, current.1, previous.1);

        match (horizontal, vertical) {
            (0, 0) => Direction::Still,
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            (0, -1) => Direction::Up,
            (0, 1) => Direction::Down,
            (-1, -1) => Direction::UpperLeft,
            (1, -1) => Direction::UpperRight,
            (-1, 1) => Direction::LowerLeft,
            _ => Direction::LowerRight,
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Still => "Still",
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::UpperLeft => "Upper left",
            Direction::UpperRight => "Upper right",
            Direction::LowerLeft => "Lower left",
            Direction::LowerRight => "Lower right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether one axis moved by at least `threshold`. Works for any pair of
/// coordinates, however far apart.
fn axis_moved(threshold: i32, current: i32, previous: i32) -> bool {
    current.abs_diff(previous) >= threshold.max(0).unsigned_abs()
}

/// `-1`, `0` or `1`: which way one axis moved, if it moved far enough.
fn axis_step(threshold: i32, current: i32, previous: i32) -> i32 {
    if axis_moved(threshold, current, previous) {
        current.cmp(&previous) as i32
    } else {
        0
    }
}

/// Which axes moved past the threshold in one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisMotion {
    /// The hand moved sideways.
    pub x: bool,
    /// The hand moved up or down.
    pub y: bool,
}

/// Result of feeding one tracked point into a [`TrackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Direction relative to the previously latched point.
    pub direction: Direction,
    /// The axes that were latched.
    pub moved: AxisMotion,
}

/// The last latched hand coordinate. Each axis is latched independently,
/// and only once it has moved by at least the threshold, which low-pass
/// filters small jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackState {
    previous: Pixel,
    threshold: i32,
}

impl Default for TrackState {
    fn default() -> Self {
        Self::new(PIXEL_THRESHOLD)
    }
}

impl TrackState {
    /// A fresh track anchored at the image origin.
    pub fn new(threshold: i32) -> Self {
        Self {
            previous: (0, 0),
            threshold,
        }
    }

    /// The latched coordinate.
    pub fn previous(&self) -> Pixel {
        self.previous
    }

    /// The hysteresis threshold in pixels.
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Classifies the motion to `current` and latches the axes that moved.
    pub fn observe(&mut self, current: Pixel) -> Observation {
        let direction = Direction::classify(self.threshold, current, self.previous);
        let moved = AxisMotion {
            x: axis_moved(self.threshold, current.0, self.previous.0),
            y: axis_moved(self.threshold, current.1, self.previous.1),
        };
        if moved.x {
            self.previous.0 = current.0;
        }
        if moved.y {
            self.previous.1 = current.1;
        }
        Observation { direction, moved }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_motion_is_still() {
        assert_eq!(Direction::classify(5, (104, 96), (100, 100)), Direction::Still);
    }

    #[test]
    fn all_eight_directions() {
        let origin = (100, 100);
        let cases = [
            ((110, 100), Direction::Right),
            ((90, 100), Direction::Left),
            ((100, 90), Direction::Up),
            ((100, 110), Direction::Down),
            ((90, 90), Direction::UpperLeft),
            ((110, 90), Direction::UpperRight),
            ((90, 110), Direction::LowerLeft),
            ((110, 110), Direction::LowerRight),
        ];
        for (current, expected) in cases {
            assert_eq!(Direction::classify(5, current, origin), expected);
        }
    }

    #[test]
    fn pure_horizontal_motion_ignores_small_vertical_jitter() {
        assert_eq!(Direction::classify(5, (120, 103), (100, 100)), Direction::Right);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(Direction::classify(5, (105, 100), (100, 100)), Direction::Right);
    }

    #[test]
    fn far_apart_coordinates_do_not_overflow() {
        assert_eq!(
            Direction::classify(5, (i32::MIN, i32::MIN), (i32::MAX, i32::MAX)),
            Direction::UpperLeft
        );
        assert_eq!(
            Direction::classify(5, (i32::MAX, 0), (i32::MIN, 0)),
            Direction::Right
        );

        let mut track = TrackState::default();
        let observation = track.observe((i32::MIN, i32::MIN));
        assert_eq!(observation.moved, AxisMotion { x: true, y: true });
        assert_eq!(track.previous(), (i32::MIN, i32::MIN));
        assert_eq!(track.observe((i32::MIN + 2, i32::MIN)).direction, Direction::Still);
    }

    #[test]
    fn labels() {
        assert_eq!(Direction::UpperLeft.to_string(), "Upper left");
        assert_eq!(Direction::Still.to_string(), "Still");
    }

    #[test]
    fn only_moving_axis_is_latched() {
        let mut track = TrackState::new(5);
        let first = track.observe((200, 2));
        assert_eq!(first.direction, Direction::Right);
        assert_eq!(first.moved, AxisMotion { x: true, y: false });
        assert_eq!(track.previous(), (200, 0));

        // Creeping up on y one pixel at a time never latches.
        for y in 3..=4 {
            track.observe((200, y));
        }
        assert_eq!(track.previous(), (200, 0));

        let jump = track.observe((201, 9));
        assert_eq!(jump.direction, Direction::Down);
        assert_eq!(track.previous(), (200, 9));
    }
}
