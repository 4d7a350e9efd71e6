// Commandline argument parser using clap for the arm controller

use crate::config::{ControlMethod, SETUP_FILE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Drives a robotic arm by hand gestures or voice commands
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct ArmArgs {
    #[command(subcommand, long_about)]
    /// Which task to perform: drive the arm, list ports, or edit the setup
    pub command: CommandTask,

    /// Setup file holding the port, capture device, control method and api key
    #[arg(short = 's', long = "setup", default_value = SETUP_FILE)]
    pub setup: PathBuf,
}

#[allow(missing_docs)]
#[derive(Debug, Subcommand, Clone)]
pub enum CommandTask {
    /// Start a control session with the configured method
    #[command(about)]
    Run(RunCommand),

    /// List the serial ports the controller could be on
    #[command(about)]
    Ports,

    /// Change values in the setup file
    #[command(about)]
    Configure(ConfigureCommand),
}

/// Options for `run`
#[derive(Debug, Args, Clone)]
#[command(about)]
pub struct RunCommand {
    /// Serial device to use instead of the one named by the setup file
    #[arg(short = 'p', long = "port")]
    pub port: Option<PathBuf>,

    /// Pick the serial device from a list before starting
    #[arg(long = "select-port", conflicts_with = "port")]
    pub select_port: bool,

    /// Control method to use instead of the one in the setup file
    #[arg(short = 'm', long = "method")]
    pub method: Option<ControlMethod>,

    /// Replay recorded detections or labels from a RON file. Without one,
    /// gesture methods use a simulated hand and voice reads labels from stdin
    #[arg(short = 'r', long = "replay")]
    pub replay: Option<PathBuf>,

    /// Seed for the simulated hand
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Log status lines instead of showing the terminal monitor
    #[arg(long = "headless")]
    pub headless: bool,
}

/// Options for `configure`
#[derive(Debug, Args, Clone)]
#[command(about)]
pub struct ConfigureCommand {
    /// Number of the serial port, as in COM3 or /dev/ttyUSB3
    #[arg(short = 'c', long = "com-port")]
    pub com_port: Option<u32>,

    /// Index of the camera or microphone
    #[arg(short = 'd', long = "capture-device")]
    pub capture_device: Option<u32>,

    /// Control method to start with
    #[arg(short = 'm', long = "method")]
    pub method: Option<ControlMethod>,

    /// Credential for the speech classification service
    #[arg(short = 'k', long = "api-key")]
    pub api_key: Option<String>,

    /// Start from the default setup rather than the current one
    #[arg(long = "restore-defaults")]
    pub restore_defaults: bool,
}
