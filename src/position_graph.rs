//! Discrete arm positions for voice control.
//!
//! The nine positions form a 3x3 grid: columns left, center, right and rows
//! upper, middle, lower, with `Initial` in the middle. A directional command
//! steps one cell in that direction and stays put at the edge of the grid.

use crate::pose::ArmPose;
use std::{fmt, str::FromStr};

/// Gripper angle for the `open` command.
pub const GRIPPER_OPEN: i32 = 120;
/// Gripper angle for the `close` command, and at session start.
pub const GRIPPER_CLOSED: i32 = 10;

/// Label the classifier returns when the user asked to stop listening.
pub const ABORT_SENTINEL: &str = "alternative_stop_flag";

/// A named cell of the position grid.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionNode {
    Initial,
    Up,
    Down,
    Left,
    Right,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// A grid step.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

impl PositionNode {
    /// Every node, in no particular order.
    pub const ALL: [PositionNode; 9] = [
        PositionNode::Initial,
        PositionNode::Up,
        PositionNode::Down,
        PositionNode::Left,
        PositionNode::Right,
        PositionNode::UpperLeft,
        PositionNode::UpperRight,
        PositionNode::LowerLeft,
        PositionNode::LowerRight,
    ];

    /// Key the node is known by.
    pub fn key(&self) -> &'static str {
        match self {
            PositionNode::Initial => "initial",
            PositionNode::Up => "up",
            PositionNode::Down => "down",
            PositionNode::Left => "left",
            PositionNode::Right => "right",
            PositionNode::UpperLeft => "upper_left",
            PositionNode::UpperRight => "upper_right",
            PositionNode::LowerLeft => "lower_left",
            PositionNode::LowerRight => "lower_right",
        }
    }

    /// Servo angles for this cell. The gripper angle is a placeholder; the
    /// graph overrides it with the current gripper state.
    pub fn template(&self) -> ArmPose {
        let (base, arm1, arm2) = match self {
            PositionNode::Initial => (90, 120, 110),
            PositionNode::Right => (175, 120, 110),
            PositionNode::Left => (5, 120, 110),
            PositionNode::Up => (90, 175, 100),
            PositionNode::Down => (90, 105, 160),
            PositionNode::UpperRight => (175, 170, 100),
            PositionNode::LowerRight => (175, 100, 170),
            PositionNode::UpperLeft => (0, 170, 100),
            PositionNode::LowerLeft => (0, 100, 170),
        };
        ArmPose::clamped(base, GRIPPER_CLOSED, arm1, arm2)
    }

    /// Grid cell as (column, row), both in `-1..=1`; row `-1` is the top.
    fn cell(&self) -> (i8, i8) {
        match self {
            PositionNode::UpperLeft => (-1, -1),
            PositionNode::Up => (0, -1),
            PositionNode::UpperRight => (1, -1),
            PositionNode::Left => (-1, 0),
            PositionNode::Initial => (0, 0),
            PositionNode::Right => (1, 0),
            PositionNode::LowerLeft => (-1, 1),
            PositionNode::Down => (0, 1),
            PositionNode::LowerRight => (1, 1),
        }
    }

    fn from_cell(cell: (i8, i8)) -> Self {
        match cell {
            (-1, -1) => PositionNode::UpperLeft,
            (0, -1) => PositionNode::Up,
            (1, -1) => PositionNode::UpperRight,
            (-1, 0) => PositionNode::Left,
            (1, 0) => PositionNode::Right,
            (-1, 1) => PositionNode::LowerLeft,
            (0, 1) => PositionNode::Down,
            (1, 1) => PositionNode::LowerRight,
            _ => PositionNode::Initial,
        }
    }

    /// The node one step away, or this node at the edge of the grid.
    pub fn step(self, step: Step) -> Self {
        let (col, row) = self.cell();
        let (dc, dr) = match step {
            Step::Up => (0, -1),
            Step::Down => (0, 1),
            Step::Left => (-1, 0),
            Step::Right => (1, 0),
        };
        Self::from_cell(((col + dc).clamp(-1, 1), (row + dr).clamp(-1, 1)))
    }
}

impl fmt::Display for PositionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A classifier label, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    /// Step one cell on the grid.
    Move(Step),
    /// Open the gripper.
    Open,
    /// Close the gripper.
    Close,
    /// Stop listening and end the session.
    Abort,
    /// Anything else the classifier might say.
    Other(String),
}

impl VoiceCommand {
    /// Interprets a classifier label, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "up" => VoiceCommand::Move(Step::Up),
            "down" => VoiceCommand::Move(Step::Down),
            "left" => VoiceCommand::Move(Step::Left),
            "right" => VoiceCommand::Move(Step::Right),
            "open" => VoiceCommand::Open,
            "close" => VoiceCommand::Close,
            ABORT_SENTINEL => VoiceCommand::Abort,
            other => VoiceCommand::Other(other.to_owned()),
        }
    }
}

impl FromStr for VoiceCommand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// The current cell and gripper state of a voice session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionGraph {
    current: PositionNode,
    gripper: i32,
}

impl Default for PositionGraph {
    fn default() -> Self {
        Self {
            current: PositionNode::Initial,
            gripper: GRIPPER_CLOSED,
        }
    }
}

impl PositionGraph {
    /// A graph at `Initial` with the gripper closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current cell.
    pub fn current(&self) -> PositionNode {
        self.current
    }

    /// The pose for the current cell and gripper state.
    pub fn pose(&self) -> ArmPose {
        self.current.template().with_gripper(self.gripper)
    }

    /// Applies one command and returns the resulting pose. Grip commands
    /// only change the gripper, moves only change the cell, anything else
    /// changes nothing.
    pub fn apply(&mut self, command: &VoiceCommand) -> ArmPose {
        match command {
            VoiceCommand::Move(step) => self.current = self.current.step(*step),
            VoiceCommand::Open => self.gripper = GRIPPER_OPEN,
            VoiceCommand::Close => self.gripper = GRIPPER_CLOSED,
            VoiceCommand::Abort | VoiceCommand::Other(_) => {}
        }
        self.pose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PositionNode::*;

    fn step(node: PositionNode, step: Step) -> PositionNode {
        node.step(step)
    }

    #[test]
    fn up_table() {
        let expected = [
            (Initial, Up),
            (Up, Up),
            (Down, Initial),
            (Left, UpperLeft),
            (Right, UpperRight),
            (UpperLeft, UpperLeft),
            (UpperRight, UpperRight),
            (LowerLeft, Left),
            (LowerRight, Right),
        ];
        for (from, to) in expected {
            assert_eq!(step(from, Step::Up), to, "{from} up");
        }
    }

    #[test]
    fn down_table() {
        let expected = [
            (Initial, Down),
            (Down, Down),
            (Up, Initial),
            (Left, LowerLeft),
            (Right, LowerRight),
            (UpperLeft, Left),
            (UpperRight, Right),
            (LowerLeft, LowerLeft),
            (LowerRight, LowerRight),
        ];
        for (from, to) in expected {
            assert_eq!(step(from, Step::Down), to, "{from} down");
        }
    }

    #[test]
    fn left_table() {
        let expected = [
            (Initial, Left),
            (Left, Left),
            (Right, Initial),
            (Up, UpperLeft),
            (Down, LowerLeft),
            (UpperLeft, UpperLeft),
            (LowerLeft, LowerLeft),
            (UpperRight, Up),
            (LowerRight, Down),
        ];
        for (from, to) in expected {
            assert_eq!(step(from, Step::Left), to, "{from} left");
        }
    }

    #[test]
    fn right_table() {
        let expected = [
            (Initial, Right),
            (Right, Right),
            (Left, Initial),
            (Up, UpperRight),
            (Down, LowerRight),
            (UpperLeft, Up),
            (LowerLeft, Down),
            (UpperRight, UpperRight),
            (LowerRight, LowerRight),
        ];
        for (from, to) in expected {
            assert_eq!(step(from, Step::Right), to, "{from} right");
        }
    }

    #[test]
    fn templates_are_in_range() {
        for node in PositionNode::ALL {
            for angle in node.template().angles() {
                assert!(angle <= 180);
            }
        }
    }

    #[test]
    fn up_from_initial_keeps_gripper() {
        let mut graph = PositionGraph::new();
        graph.apply(&VoiceCommand::Open);
        let pose = graph.apply(&"up".parse().unwrap());
        assert_eq!(graph.current(), Up);
        assert_eq!(pose.angles(), [90, 120, 175, 100]);
    }

    #[test]
    fn left_from_upper_right_goes_up() {
        let mut graph = PositionGraph {
            current: UpperRight,
            gripper: GRIPPER_CLOSED,
        };
        graph.apply(&VoiceCommand::Move(Step::Left));
        assert_eq!(graph.current(), Up);
    }

    #[test]
    fn grip_commands_do_not_move() {
        let mut graph = PositionGraph::new();
        let pose = graph.apply(&VoiceCommand::Open);
        assert_eq!(graph.current(), Initial);
        assert_eq!(pose.angles(), [90, 120, 120, 110]);
        let pose = graph.apply(&VoiceCommand::Close);
        assert_eq!(pose.gripper(), 10);
    }

    #[test]
    fn unknown_labels_change_nothing() {
        let mut graph = PositionGraph::new();
        graph.apply(&VoiceCommand::Move(Step::Right));
        let before = graph.clone();
        graph.apply(&"banana".parse().unwrap());
        assert_eq!(graph, before);
    }

    #[test]
    fn labels_are_trimmed() {
        assert_eq!(
            " down\n".parse::<VoiceCommand>().unwrap(),
            VoiceCommand::Move(Step::Down)
        );
        assert_eq!(
            "alternative_stop_flag\n".parse::<VoiceCommand>().unwrap(),
            VoiceCommand::Abort
        );
    }
}
