//! Manual control: the arm follows the user's hand around the frame.

use super::{Decision, Devices, FrameClock, Modality, StatusReport};
use crate::detection::{select_best, Frame, Pixel, WorkingEnvelope};
use crate::direction::{Direction, TrackState};
use crate::mapper::{self, CLASS_CLOSED_HAND, HAND_CLASSES};
use crate::pose::ArmPose;
use log::trace;
use std::fmt;

/// Whether the tracked hand is open or closed.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandState {
    Open,
    Closed,
    None,
}

impl fmt::Display for HandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandState::Open => "Open",
            HandState::Closed => "Closed",
            HandState::None => "None",
        })
    }
}

/// Status of one manual control frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualStatus {
    /// Capture device and serial port of the session.
    pub devices: Devices,
    /// Whether the hand is inside the working envelope.
    pub in_range: bool,
    /// Center of the tracked hand, if there was one.
    pub position: Option<Pixel>,
    /// Open, closed, or no hand at all.
    pub state: HandState,
    /// How the hand moved since the last latched point.
    pub direction: Direction,
    /// Frames per second at the time of this frame.
    pub fps: u32,
    /// Model inference time, in milliseconds.
    pub inference_speed: String,
}

impl fmt::Display for ManualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = match self.position {
            Some((x, y)) => format!("({x}, {y})"),
            None => "(-, -)".to_owned(),
        };
        write!(
            f,
            "device {} | COM{} | in range: {} | position: {} | state: {} | direction: {} | {} fps | inference {} ms",
            self.devices.capture_device,
            self.devices.com_port,
            if self.in_range { "Yes" } else { "No" },
            position,
            self.state,
            self.direction,
            self.fps,
            self.inference_speed,
        )
    }
}

/// Manual hand tracking. The base and arm angles are only recomputed for
/// an axis once the hand has moved past the tracking threshold on it, so
/// small jitter neither moves the arm nor floods the serial link.
pub struct ManualGestures {
    devices: Devices,
    envelope: WorkingEnvelope,
    track: TrackState,
    rotating_base: i32,
    arm1: i32,
    arm2: i32,
    clock: FrameClock,
}

impl ManualGestures {
    /// A fresh tracker with the arm assumed at rest.
    pub fn new(devices: Devices, envelope: WorkingEnvelope, track: TrackState) -> Self {
        Self {
            devices,
            envelope,
            track,
            rotating_base: ArmPose::REST.rotating_base() as i32,
            arm1: ArmPose::REST.arm1() as i32,
            arm2: ArmPose::REST.arm2() as i32,
            clock: FrameClock::default(),
        }
    }

    /// The current track.
    pub fn track(&self) -> &TrackState {
        &self.track
    }
}

impl Modality for ManualGestures {
    type Input = Frame;

    fn decide(&mut self, frame: Frame) -> Decision {
        let fps = self.clock.tick();
        let inference_speed = frame.inference_ms.to_string();

        let Some(best) = select_best(&frame.detections, &HAND_CLASSES) else {
            return Decision::Idle(StatusReport::Manual(ManualStatus {
                devices: self.devices,
                in_range: false,
                position: None,
                state: HandState::None,
                direction: Direction::Still,
                fps,
                inference_speed,
            }));
        };

        let center = best.center();
        let observation = self.track.observe(center);
        if observation.moved.x {
            self.rotating_base = mapper::rotating_base_angle(&self.envelope, center.0);
        }
        if observation.moved.y {
            (self.arm1, self.arm2) = mapper::arm_angles(&self.envelope, center.1);
        }

        // select_best only lets hand classes through.
        let gripper = mapper::gripper_angle(best.class).unwrap_or(mapper::GRIPPER_CLOSED);
        let state = if best.class == CLASS_CLOSED_HAND {
            HandState::Closed
        } else {
            HandState::Open
        };

        let in_range = self.envelope.contains(center);
        let status = StatusReport::Manual(ManualStatus {
            devices: self.devices,
            in_range,
            position: Some(center),
            state,
            direction: observation.direction,
            fps,
            inference_speed,
        });

        if !in_range {
            trace!("{self}: hand at {center:?} is outside the envelope");
            return Decision::Idle(status);
        }

        let pose = ArmPose::clamped(self.rotating_base, gripper, self.arm1, self.arm2);
        Decision::Command(pose, status)
    }
}

impl fmt::Display for ManualGestures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManualGestures")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{BoundingBox, Detection, WORKING_ENVELOPE};
    use crate::mapper::CLASS_OPEN_HAND;

    fn hand_at(class: u32, x: f32, y: f32) -> Frame {
        let bbox = BoundingBox::new(x - 20.0, y - 20.0, x + 20.0, y + 20.0);
        Frame::new(vec![Detection::new(class, 0.9, bbox)], 12.5)
    }

    fn manual() -> ManualGestures {
        ManualGestures::new(Devices::default(), WORKING_ENVELOPE, TrackState::new(5))
    }

    fn status_of(decision: &Decision) -> &ManualStatus {
        match decision {
            Decision::Command(_, StatusReport::Manual(s)) | Decision::Idle(StatusReport::Manual(s)) => s,
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn empty_frame_sends_nothing() {
        let decision = manual().decide(Frame::default());
        let status = status_of(&decision);
        assert!(matches!(decision, Decision::Idle(_)));
        assert!(!status.in_range);
        assert_eq!(status.state, HandState::None);
        assert_eq!(status.position, None);
    }

    #[test]
    fn unknown_classes_are_no_detection() {
        let decision = manual().decide(hand_at(4, 320.0, 240.0));
        assert!(matches!(decision, Decision::Idle(_)));
        assert_eq!(status_of(&decision).state, HandState::None);
    }

    #[test]
    fn hand_in_range_commands_the_arm() {
        let decision = manual().decide(hand_at(CLASS_OPEN_HAND, 320.0, 240.0));
        match &decision {
            Decision::Command(pose, _) => {
                assert_eq!(pose.rotating_base(), 90);
                assert_eq!(pose.gripper(), 120);
                assert_eq!((pose.arm1(), pose.arm2()), (120, 135));
            }
            other => panic!("expected a command, got {other:?}"),
        }
        let status = status_of(&decision);
        assert!(status.in_range);
        assert_eq!(status.state, HandState::Open);
        assert_eq!(status.position, Some((320, 240)));
        assert_eq!(status.inference_speed, "12.5");
    }

    #[test]
    fn hand_out_of_range_reports_but_does_not_command() {
        let decision = manual().decide(hand_at(CLASS_CLOSED_HAND, 40.0, 40.0));
        assert!(matches!(decision, Decision::Idle(_)));
        let status = status_of(&decision);
        assert!(!status.in_range);
        assert_eq!(status.state, HandState::Closed);
    }

    #[test]
    fn jitter_keeps_previous_angles() {
        let mut manual = manual();
        let first = match manual.decide(hand_at(CLASS_CLOSED_HAND, 320.0, 240.0)) {
            Decision::Command(pose, _) => pose,
            other => panic!("{other:?}"),
        };
        // Small wobble on both axes.
        let decision = manual.decide(hand_at(CLASS_CLOSED_HAND, 323.0, 237.0));
        assert_eq!(status_of(&decision).direction, Direction::Still);
        match decision {
            Decision::Command(pose, _) => assert_eq!(pose, first),
            other => panic!("{other:?}"),
        }
        assert_eq!(manual.track().previous(), (320, 240));
    }

    #[test]
    fn only_the_moving_axis_is_recomputed() {
        let mut manual = manual();
        manual.decide(hand_at(CLASS_CLOSED_HAND, 320.0, 240.0));
        let decision = manual.decide(hand_at(CLASS_CLOSED_HAND, 160.0, 242.0));
        assert_eq!(status_of(&decision).direction, Direction::Left);
        match decision {
            Decision::Command(pose, _) => {
                assert_eq!(pose.rotating_base(), 180);
                assert_eq!((pose.arm1(), pose.arm2()), (120, 135));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn hand_far_off_the_image_is_out_of_range() {
        let far = BoundingBox::new(-1e10, -1e10, -1e10 + 1.0, -1e10 + 1.0);
        let mut manual = manual();
        let frame = Frame::new(vec![Detection::new(CLASS_OPEN_HAND, 0.9, far)], 1.0);
        let decision = manual.decide(frame);
        assert!(matches!(decision, Decision::Idle(_)));
        let status = status_of(&decision);
        assert!(!status.in_range);
        assert_eq!(status.position, Some((i32::MIN, i32::MIN)));
        assert_eq!(status.direction, Direction::UpperLeft);

        // Coming back into view from there still works.
        let decision = manual.decide(hand_at(CLASS_OPEN_HAND, 320.0, 240.0));
        assert!(matches!(decision, Decision::Command(..)));
        assert_eq!(status_of(&decision).direction, Direction::LowerRight);
    }

    #[test]
    fn biggest_hand_is_tracked() {
        let small = Detection::new(
            CLASS_OPEN_HAND,
            0.99,
            BoundingBox::new(190.0, 100.0, 200.0, 110.0),
        );
        let big = Detection::new(
            CLASS_CLOSED_HAND,
            0.9,
            BoundingBox::new(300.0, 220.0, 340.0, 260.0),
        );
        let decision = manual().decide(Frame::new(vec![small, big], 1.0));
        let status = status_of(&decision);
        assert_eq!(status.position, Some((320, 240)));
        assert_eq!(status.state, HandState::Closed);
    }
}
