//! Defines the [`Modality`] trait shared by the three control methods. Each
//! modality turns one input (a video frame's detections, or a classified
//! voice label) into at most one pose for the arm plus a status report, so
//! that the [worker](crate::worker) loop can drive any of them the same way.

mod automatic;
mod manual;
mod voice;

pub use automatic::{AutoGesture, AutomaticGestures, AutomaticStatus};
pub use manual::{HandState, ManualGestures, ManualStatus};
pub use voice::{VoiceControl, VoiceStatus};

use crate::pose::ArmPose;
use std::fmt;
use std::time::Instant;

/// Where the inputs and outputs of a session live, echoed in every status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Devices {
    /// Capture (camera or microphone) device index.
    pub capture_device: u32,
    /// Serial port number of the controller.
    pub com_port: u32,
}

/// What a modality decided for one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Send this pose, then report the status.
    Command(ArmPose, StatusReport),
    /// Nothing to send; only report the status.
    Idle(StatusReport),
    /// The input asked for the whole modality to stop.
    Abort,
}

/// The status record of one decision cycle.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport {
    Manual(ManualStatus),
    Automatic(AutomaticStatus),
    Voice(VoiceStatus),
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusReport::Manual(s) => s.fmt(f),
            StatusReport::Automatic(s) => s.fmt(f),
            StatusReport::Voice(s) => s.fmt(f),
        }
    }
}

///
/// One of the ways of controlling the arm. A modality owns all of the state
/// that has to survive between inputs, so a fresh one is built every time a
/// session starts.
///
pub trait Modality: fmt::Display + Send {
    /// What the modality consumes once per decision cycle.
    type Input: Send;

    /// Decides what to do about one input.
    fn decide(&mut self, input: Self::Input) -> Decision;
}

/// Frames per second, measured between consecutive calls to [`tick`].
///
/// [`tick`]: FrameClock::tick
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    /// Records a frame and returns the instantaneous rate. The first frame
    /// reports zero.
    pub fn tick(&mut self) -> u32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> u32 {
        let fps = match self.last {
            Some(last) => {
                let elapsed = now.duration_since(last).as_secs_f64();
                if elapsed > 0.0 {
                    (1.0 / elapsed).round() as u32
                } else {
                    0
                }
            }
            None => 0,
        };
        self.last = Some(now);
        fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn frame_clock_measures_rate() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0);
        assert_eq!(clock.tick_at(start + Duration::from_millis(40)), 25);
        assert_eq!(clock.tick_at(start + Duration::from_millis(140)), 10);
    }
}
