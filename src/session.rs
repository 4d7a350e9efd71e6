//! A [`Session`] is one run of one control method: it reads the setup, opens
//! the controller, builds a fresh modality and hands all three to a worker.
//! Stopping the session, or any fault the worker reports, releases the
//! controller and discards the modality, so the next start begins from
//! scratch.

use crate::config::{ControlMethod, SessionConfig};
use crate::detection::{Frame, WorkingEnvelope};
use crate::direction::TrackState;
use crate::modality::{AutomaticGestures, Devices, ManualGestures, VoiceControl};
use crate::transport::{NullTransport, SerialTransport, Transport};
use crate::worker::{spawn_worker, RunFlag, WorkerEvent, WorkerExit, WorkerHandle, WorkerMessage};
use log::{debug, info, warn};
use std::{
    error::Error,
    fmt,
    path::PathBuf,
    sync::mpsc::{channel, Receiver, Sender},
};

/// Where a session's inputs come from.
pub enum InputSource {
    /// Detection frames, for either gesture method.
    Frames(Box<dyn Iterator<Item = Frame> + Send>),
    /// Classifier labels, for voice control.
    Labels(Box<dyn Iterator<Item = String> + Send>),
}

impl InputSource {
    /// Detection frames from any iterator.
    pub fn frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Frame>,
        I::IntoIter: Send + 'static,
    {
        InputSource::Frames(Box::new(frames.into_iter()))
    }

    /// Classifier labels from any iterator.
    pub fn labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        InputSource::Labels(Box::new(labels.into_iter()))
    }

    fn kind(&self) -> &'static str {
        match self {
            InputSource::Frames(_) => "detection frames",
            InputSource::Labels(_) => "voice labels",
        }
    }
}

/// Why a session could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A worker is already running; stop it first.
    AlreadyRunning,
    /// The input source does not fit the configured control method.
    SourceMismatch {
        /// The configured method.
        method: ControlMethod,
        /// What was supplied instead.
        source: &'static str,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyRunning => write!(f, "a session is already running"),
            SessionError::SourceMismatch { method, source } => {
                write!(f, "{} cannot be driven by {}", method, source)
            }
        }
    }
}

impl Error for SessionError {}

/// Owns the running worker, if any, and the setup it was started with.
pub struct Session {
    config: SessionConfig,
    envelope: WorkingEnvelope,
    port_override: Option<PathBuf>,
    worker: Option<WorkerHandle>,
    next_flag: Option<RunFlag>,
    events: Sender<WorkerMessage>,
}

impl Session {
    /// A stopped session. Worker messages arrive on the returned receiver
    /// and should be passed back through [`handle_event`](Self::handle_event).
    pub fn new(config: SessionConfig) -> (Self, Receiver<WorkerMessage>) {
        let (events, rx) = channel();
        (
            Self {
                config,
                envelope: WorkingEnvelope::default(),
                port_override: None,
                worker: None,
                next_flag: None,
                events,
            },
            rx,
        )
    }

    /// Uses `port` instead of the one named by the setup.
    pub fn with_port(mut self, port: impl Into<PathBuf>) -> Self {
        self.port_override = Some(port.into());
        self
    }

    /// Uses a different working envelope for the gesture methods.
    pub fn with_envelope(mut self, envelope: WorkingEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// The setup this session starts workers with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The serial device the controller is expected on.
    pub fn port(&self) -> PathBuf {
        self.port_override
            .clone()
            .unwrap_or_else(|| self.config.port_path())
    }

    /// Whether a worker is running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| w.is_running())
    }

    /// The flag of the running worker, or of the next one to start if none
    /// is running. Input sources that block hold on to it so they give up
    /// once the session stops.
    pub fn run_flag(&mut self) -> RunFlag {
        match &self.worker {
            Some(worker) if worker.is_running() => worker.flag().clone(),
            _ => self.next_flag.get_or_insert_with(RunFlag::new).clone(),
        }
    }

    /// Opens the controller and starts a worker on `source`. If the
    /// controller cannot be opened the session still runs, without moving
    /// the arm.
    pub fn start(&mut self, source: InputSource) -> Result<(), SessionError> {
        self.check(&source)?;
        let port = self.port();
        let transport: Box<dyn Transport> = match SerialTransport::open(&port) {
            Ok(serial) => Box::new(serial),
            Err(error) => {
                warn!("{}, running without a controller.", error);
                Box::new(NullTransport)
            }
        };
        self.start_with_transport(source, transport)
    }

    /// Starts a worker on `source` that writes to `transport`, with a
    /// freshly built modality for the configured control method.
    pub fn start_with_transport(
        &mut self,
        source: InputSource,
        transport: Box<dyn Transport>,
    ) -> Result<(), SessionError> {
        self.check(&source)?;
        // A worker that stopped by itself is still parked here.
        self.stop();

        let devices = Devices {
            capture_device: self.config.capture_device,
            com_port: self.config.com_port,
        };
        let events = self.events.clone();
        let flag = self.next_flag.take().unwrap_or_default();
        let worker = match (self.config.control_method, source) {
            (ControlMethod::ManualGestures, InputSource::Frames(frames)) => spawn_worker(
                ManualGestures::new(devices, self.envelope, TrackState::default()),
                frames,
                transport,
                events,
                flag,
            ),
            (ControlMethod::AutomaticGestures, InputSource::Frames(frames)) => spawn_worker(
                AutomaticGestures::new(devices, self.envelope),
                frames,
                transport,
                events,
                flag,
            ),
            (ControlMethod::Voice, InputSource::Labels(labels)) => spawn_worker(
                VoiceControl::new(devices),
                labels,
                transport,
                events,
                flag,
            ),
            (method, source) => {
                return Err(SessionError::SourceMismatch {
                    method,
                    source: source.kind(),
                })
            }
        };
        info!("Session started: {}", self.config.control_method);
        self.worker = Some(worker);
        Ok(())
    }

    /// Stops the worker, if any, and waits for it to release the
    /// controller.
    pub fn stop(&mut self) -> Option<WorkerExit> {
        let mut worker = self.worker.take()?;
        let exit = worker.stop();
        info!("Session stopped: {} ({:?})", worker.name(), exit);
        exit
    }

    /// Reacts to a message from the worker: faults and stops end the
    /// session. Messages left over from an earlier worker are ignored.
    /// Returns `false` once the session has ended, so callers can stop
    /// reading messages.
    pub fn handle_event(&mut self, message: &WorkerMessage) -> bool {
        let current = self.worker.as_ref().map(|w| w.id());
        if current != Some(message.worker) {
            debug!("Ignoring {:?} from stale worker {}", message.event, message.worker);
            return current.is_some();
        }
        match &message.event {
            WorkerEvent::Status(_) => {}
            WorkerEvent::Fault(fault) => {
                warn!("Session fault: {}", fault);
                self.stop();
            }
            WorkerEvent::Stopped => {
                self.stop();
            }
        }
        self.worker.is_some()
    }

    fn check(&self, source: &InputSource) -> Result<(), SessionError> {
        if self.is_running() {
            return Err(SessionError::AlreadyRunning);
        }
        let fits = matches!(
            (self.config.control_method, source),
            (ControlMethod::Voice, InputSource::Labels(_))
                | (ControlMethod::ManualGestures, InputSource::Frames(_))
                | (ControlMethod::AutomaticGestures, InputSource::Frames(_))
        );
        if fits {
            Ok(())
        } else {
            Err(SessionError::SourceMismatch {
                method: self.config.control_method,
                source: source.kind(),
            })
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
