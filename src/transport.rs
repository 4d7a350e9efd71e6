//! The write-only link to the servo controller.
//!
//! Every command is exactly four raw bytes, one angle per servo, in the order
//! rotating base, gripper, arm 1, arm 2. There is no header, no checksum and
//! no acknowledgement; the controller reads fixed size frames.

use crate::pose::ArmPose;
use log::{debug, info};
use serial2::SerialPort;
use std::{
    error::Error,
    fmt, io,
    path::{Path, PathBuf},
    time::Duration,
};

/// Size of one command frame on the wire.
pub const PACKET_LEN: usize = 4;

/// Baud rate the controller firmware listens on.
pub const BAUD_RATE: u32 = 9600;

const WRITE_TIMEOUT: Duration = Duration::from_millis(200);

/// Encodes a pose into a wire frame.
pub fn encode(pose: &ArmPose) -> [u8; PACKET_LEN] {
    pose.angles()
}

/// Failures of the link to the controller.
#[derive(Debug)]
pub enum TransportError {
    /// The port could not be opened.
    Open {
        /// Port that was requested.
        port: PathBuf,
        /// Underlying io error.
        source: io::Error,
    },
    /// A frame could not be written.
    Write(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::Open { port, source } => {
                write!(f, "unable to open {}: {}", port.display(), source)
            }
            TransportError::Write(error) => write!(f, "serial write failed: {}", error),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransportError::Open { source, .. } => Some(source),
            TransportError::Write(error) => Some(error),
        }
    }
}

/// Somewhere poses can be sent. Owned by exactly one worker at a time.
pub trait Transport: Send {
    /// Sends one full pose.
    fn send(&mut self, pose: &ArmPose) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, pose: &ArmPose) -> Result<(), TransportError> {
        (**self).send(pose)
    }
}

/// The controller on a serial port. The port is closed when this is dropped.
pub struct SerialTransport {
    port: SerialPort,
    name: PathBuf,
}

impl SerialTransport {
    /// Opens `path` at [`BAUD_RATE`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let name = path.as_ref().to_path_buf();
        let open = || -> io::Result<SerialPort> {
            let mut port = SerialPort::open(&name, BAUD_RATE)?;
            port.set_write_timeout(WRITE_TIMEOUT)?;
            port.set_read_timeout(WRITE_TIMEOUT)?;
            Ok(port)
        };
        let port = open().map_err(|source| TransportError::Open {
            port: name.clone(),
            source,
        })?;
        info!("Opened {} at {} baud", name.display(), BAUD_RATE);
        Ok(Self { port, name })
    }

    /// Lists the serial ports present on this machine.
    pub fn available_ports() -> io::Result<Vec<PathBuf>> {
        SerialPort::available_ports()
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, pose: &ArmPose) -> Result<(), TransportError> {
        debug!("{} <- {:?}", self.name.display(), encode(pose));
        self.port
            .write_all(&encode(pose))
            .map_err(TransportError::Write)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        info!("Closing {}", self.name.display());
    }
}

/// Stand-in used when no controller could be opened; the rest of the
/// pipeline keeps running without moving anything.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, pose: &ArmPose) -> Result<(), TransportError> {
        debug!("No controller attached, dropping {}", pose);
        Ok(())
    }
}

/// Sends frames into any [`io::Write`], e.g. a file or a pipe to a simulator.
pub struct WriterTransport<W> {
    writer: W,
}

impl<W> WriterTransport<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Gives the writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write + Send> Transport for WriterTransport<W> {
    fn send(&mut self, pose: &ArmPose) -> Result<(), TransportError> {
        self.writer
            .write_all(&encode(pose))
            .and_then(|_| self.writer.flush())
            .map_err(TransportError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_wire_order() {
        let pose = ArmPose::clamped(10, 120, 70, 110);
        assert_eq!(encode(&pose), [10, 120, 70, 110]);
        assert_eq!(encode(&pose).len(), PACKET_LEN);
    }

    #[test]
    fn writer_transport_emits_exactly_four_bytes_per_pose() {
        let mut transport = WriterTransport::new(Vec::new());
        transport.send(&ArmPose::clamped(10, 120, 70, 110)).unwrap();
        transport.send(&ArmPose::REST).unwrap();
        assert_eq!(
            transport.into_inner(),
            vec![10, 120, 70, 110, 90, 10, 90, 90]
        );
    }

    #[test]
    fn opening_a_missing_port_fails() {
        let result = SerialTransport::open("/definitely/not/a/serial/port");
        assert!(matches!(result, Err(TransportError::Open { .. })));
    }
}
