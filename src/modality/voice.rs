//! Voice control: spoken directions walk the arm around the position grid.

use super::{Decision, Devices, Modality, StatusReport};
use crate::pose::ArmPose;
use crate::position_graph::{PositionGraph, PositionNode, VoiceCommand};
use log::info;
use std::fmt;

/// Status of one voice classification.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceStatus {
    /// Microphone and serial port of the session.
    pub devices: Devices,
    /// The label the classifier returned.
    pub predicted_class: String,
    /// The grid cell after applying it.
    pub position_key: PositionNode,
    /// The pose sent for that cell.
    pub position: ArmPose,
}

impl fmt::Display for VoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device {} | COM{} | class: {} | position key: {} | position: {}",
            self.devices.capture_device,
            self.devices.com_port,
            self.predicted_class,
            self.position_key,
            self.position,
        )
    }
}

/// Voice driven control over a [`PositionGraph`]. Every classification
/// sends a full pose, even if nothing changed.
pub struct VoiceControl {
    devices: Devices,
    graph: PositionGraph,
}

impl VoiceControl {
    /// Starts at the initial position with the gripper closed.
    pub fn new(devices: Devices) -> Self {
        Self {
            devices,
            graph: PositionGraph::new(),
        }
    }

    /// The position graph.
    pub fn graph(&self) -> &PositionGraph {
        &self.graph
    }
}

impl Modality for VoiceControl {
    type Input = String;

    fn decide(&mut self, label: String) -> Decision {
        let command = VoiceCommand::from_label(&label);
        if command == VoiceCommand::Abort {
            info!("{self}: classifier asked to stop");
            return Decision::Abort;
        }

        let pose = self.graph.apply(&command);
        Decision::Command(
            pose,
            StatusReport::Voice(VoiceStatus {
                devices: self.devices,
                predicted_class: label.trim().to_owned(),
                position_key: self.graph.current(),
                position: pose,
            }),
        )
    }
}

impl fmt::Display for VoiceControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoiceControl")
    }
}
