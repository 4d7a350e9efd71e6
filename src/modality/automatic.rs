//! Automatic control: a few discrete hand gestures each trigger a canned
//! arm motion.

use super::{Decision, Devices, FrameClock, Modality, StatusReport};
use crate::detection::{select_best, Frame, WorkingEnvelope};
use crate::geometry::TwoLinkArm;
use crate::pose::{clamp_angle_f64, ArmPose};
use log::{debug, warn};
use std::fmt;

/// Where the `search` gesture sends the gripper, in centimeters.
pub const SEARCH_TARGET_CM: (f64, f64) = (10.0, 15.0);

const GESTURE_CLASSES: [u32; 4] = [0, 1, 2, 3];

/// The gestures the automatic model recognises.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoGesture {
    Start,
    Search,
    Grab,
    Stop,
}

impl AutoGesture {
    /// Maps a detector class id to a gesture.
    pub fn from_class(class: u32) -> Option<Self> {
        match class {
            0 => Some(AutoGesture::Start),
            1 => Some(AutoGesture::Search),
            2 => Some(AutoGesture::Grab),
            3 => Some(AutoGesture::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for AutoGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AutoGesture::Start => "start",
            AutoGesture::Search => "search",
            AutoGesture::Grab => "grab",
            AutoGesture::Stop => "stop",
        })
    }
}

/// Status of one automatic control frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomaticStatus {
    /// Capture device and serial port of the session.
    pub devices: Devices,
    /// Whether the gesture was made inside the working envelope.
    pub in_range: bool,
    /// The gesture acted upon, if any.
    pub hand_class: Option<AutoGesture>,
    /// Frames per second at the time of this frame.
    pub fps: u32,
    /// Model inference time, in milliseconds.
    pub inference_speed: String,
}

impl fmt::Display for AutomaticStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self
            .hand_class
            .map_or_else(|| "None".to_owned(), |g| g.to_string());
        write!(
            f,
            "device {} | COM{} | in range: {} | class: {} | {} fps | inference {} ms",
            self.devices.capture_device,
            self.devices.com_port,
            if self.in_range { "Yes" } else { "No" },
            class,
            self.fps,
            self.inference_speed,
        )
    }
}

/// Gesture driven control. Remembers the last commanded pose so that `grab`
/// can close the gripper wherever the arm currently is.
pub struct AutomaticGestures {
    devices: Devices,
    envelope: WorkingEnvelope,
    arm: TwoLinkArm,
    search_target: (f64, f64),
    last_position: ArmPose,
    clock: FrameClock,
}

impl AutomaticGestures {
    /// A fresh controller with the arm assumed at rest.
    pub fn new(devices: Devices, envelope: WorkingEnvelope) -> Self {
        Self {
            devices,
            envelope,
            arm: TwoLinkArm::default(),
            search_target: SEARCH_TARGET_CM,
            last_position: ArmPose::REST,
            clock: FrameClock::default(),
        }
    }

    /// Changes where `search` reaches for.
    pub fn with_search_target(mut self, x_cm: f64, y_cm: f64) -> Self {
        self.search_target = (x_cm, y_cm);
        self
    }

    /// The last pose commanded.
    pub fn last_position(&self) -> ArmPose {
        self.last_position
    }

    /// Works out the pose for a gesture and remembers it.
    pub fn command(&mut self, gesture: AutoGesture) -> ArmPose {
        let pose = match gesture {
            AutoGesture::Start => ArmPose::clamped(90, 10, 70, 110),
            AutoGesture::Search => {
                let (x, y) = self.search_target;
                let (arm1, arm2) = match self.arm.solve(x, y) {
                    Ok(angles) => (
                        clamp_angle_f64(angles.shoulder) as i32,
                        clamp_angle_f64(angles.elbow) as i32,
                    ),
                    Err(error) => {
                        warn!("{self}: {error}, holding the arm upright");
                        (ArmPose::REST.arm1() as i32, ArmPose::REST.arm2() as i32)
                    }
                };
                ArmPose::clamped(90, 170, arm1, arm2)
            }
            AutoGesture::Grab => self.last_position.with_gripper(10),
            AutoGesture::Stop => ArmPose::clamped(90, 10, 90, 90),
        };
        debug!("{self}: {gesture} -> {pose}");
        self.last_position = pose;
        pose
    }
}

impl Modality for AutomaticGestures {
    type Input = Frame;

    fn decide(&mut self, frame: Frame) -> Decision {
        let fps = self.clock.tick();
        let best = select_best(&frame.detections, &GESTURE_CLASSES);
        let in_range = best.map_or(false, |d| self.envelope.contains(d.center()));
        let hand_class = best
            .filter(|_| in_range)
            .and_then(|d| AutoGesture::from_class(d.class));

        let status = StatusReport::Automatic(AutomaticStatus {
            devices: self.devices,
            in_range,
            hand_class,
            fps,
            inference_speed: frame.inference_ms.to_string(),
        });

        match hand_class {
            Some(gesture) => Decision::Command(self.command(gesture), status),
            None => Decision::Idle(status),
        }
    }
}

impl fmt::Display for AutomaticGestures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AutomaticGestures")
    }
}
