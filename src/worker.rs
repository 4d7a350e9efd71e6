//! The control loop shared by every [`Modality`]. A worker owns its input
//! source, its modality state and its transport for as long as it runs:
//! it pulls one input, lets the modality decide, sends the pose, reports the
//! status, and repeats until it is told to stop, its input runs dry, or
//! something goes wrong.
//!
//! Faults never unwind out of the loop. A failed write or an abort request
//! is reported once as a [`WorkerEvent::Fault`], after which the worker
//! releases its transport and reports [`WorkerEvent::Stopped`].

use crate::modality::{Decision, Modality, StatusReport};
use crate::transport::{Transport, TransportError};
use log::{debug, info, warn};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
};

/// A shared "keep running" flag. Cloning it shares the flag.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl RunFlag {
    /// A raised flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Whether the worker should keep going.
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Asks everyone holding this flag to stop.
    pub fn lower(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Identifies one worker for as long as the process runs. Never reused, so
/// events still queued from a stopped worker can be told apart from those
/// of its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(u64);

impl WorkerId {
    /// A fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a worker had to stop on its own.
#[derive(Debug)]
pub enum Fault {
    /// The transport refused a frame.
    TransportWrite(TransportError),
    /// The input asked for the modality to stop.
    AbortRequested,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::TransportWrite(error) => write!(f, "{}", error),
            Fault::AbortRequested => write!(f, "abort requested"),
        }
    }
}

/// What a worker tells its session.
#[derive(Debug)]
pub enum WorkerEvent {
    /// The status of one decision cycle.
    Status(StatusReport),
    /// The worker hit a fault and is stopping.
    Fault(Fault),
    /// The worker has released its transport and is done.
    Stopped,
}

/// A [`WorkerEvent`] and the worker that sent it.
#[derive(Debug)]
pub struct WorkerMessage {
    /// The sender.
    pub worker: WorkerId,
    /// What happened.
    pub event: WorkerEvent,
}

/// How a worker loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The run flag was lowered.
    Stopped,
    /// The input source ran out.
    InputExhausted,
    /// A fault was reported.
    Faulted,
}

fn notify(events: &Sender<WorkerMessage>, worker: WorkerId, name: &str, event: WorkerEvent) {
    if let Err(error) = events.send(WorkerMessage { worker, event }) {
        debug!("{} : nobody is listening ({}).", name, error);
    }
}

/// Runs the control loop on the calling thread until it ends, then drops the
/// transport. `flag` is checked at the top of every iteration and again after
/// each input arrives, so once it is lowered no further frame is written.
pub fn run_worker<M, I, T>(
    id: WorkerId,
    mut modality: M,
    source: I,
    mut transport: T,
    events: &Sender<WorkerMessage>,
    flag: &RunFlag,
) -> WorkerExit
where
    M: Modality,
    I: IntoIterator<Item = M::Input>,
    T: Transport,
{
    let name = modality.to_string();
    let mut source = source.into_iter();
    info!("{} {} : started.", name, id);

    let exit = loop {
        if !flag.is_running() {
            break WorkerExit::Stopped;
        }
        let Some(input) = source.next() else {
            info!("{} : input exhausted.", name);
            break WorkerExit::InputExhausted;
        };
        if !flag.is_running() {
            break WorkerExit::Stopped;
        }

        let status = match modality.decide(input) {
            Decision::Command(pose, status) => {
                if let Err(error) = transport.send(&pose) {
                    warn!("{} : {}, stopping.", name, error);
                    flag.lower();
                    notify(events, id, &name, WorkerEvent::Fault(Fault::TransportWrite(error)));
                    break WorkerExit::Faulted;
                }
                status
            }
            Decision::Idle(status) => status,
            Decision::Abort => {
                flag.lower();
                notify(events, id, &name, WorkerEvent::Fault(Fault::AbortRequested));
                break WorkerExit::Faulted;
            }
        };
        notify(events, id, &name, WorkerEvent::Status(status));
    };

    drop(transport);
    info!("{} {} : terminated ({:?}).", name, id, exit);
    notify(events, id, &name, WorkerEvent::Stopped);
    exit
}

/// A worker running on its own thread.
pub struct WorkerHandle {
    id: WorkerId,
    name: String,
    flag: RunFlag,
    handle: Option<JoinHandle<WorkerExit>>,
}

impl WorkerHandle {
    /// Id carried by every message this worker sends.
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Name of the modality being run.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flag this worker checks.
    pub fn flag(&self) -> &RunFlag {
        &self.flag
    }

    /// Whether the worker thread is still going.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Lowers the flag and waits for the worker to finish its current cycle
    /// and release its transport. Returns `None` if it was already joined
    /// or panicked.
    pub fn stop(&mut self) -> Option<WorkerExit> {
        self.flag.lower();
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(exit) => Some(exit),
            Err(_) => {
                warn!("{} : worker thread panicked.", self.name);
                None
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs [`run_worker`] on a new thread.
pub fn spawn_worker<M, I, T>(
    modality: M,
    source: I,
    transport: T,
    events: Sender<WorkerMessage>,
    flag: RunFlag,
) -> WorkerHandle
where
    M: Modality + 'static,
    I: IntoIterator<Item = M::Input> + Send + 'static,
    T: Transport + 'static,
{
    let id = WorkerId::next();
    let name = modality.to_string();
    let thread_flag = flag.clone();
    let handle =
        thread::spawn(move || run_worker(id, modality, source, transport, &events, &thread_flag));
    WorkerHandle {
        id,
        name,
        flag,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{BoundingBox, Detection, Frame, WORKING_ENVELOPE};
    use crate::modality::{AutomaticGestures, Devices, VoiceControl};
    use crate::pose::ArmPose;
    use std::io;
    use std::sync::mpsc::{channel, Receiver};
    use std::sync::Mutex;

    /// Records poses, failing every write after the first `budget`.
    struct MockTransport {
        sent: Arc<Mutex<Vec<ArmPose>>>,
        budget: usize,
    }

    impl MockTransport {
        fn new(budget: usize) -> (Self, Arc<Mutex<Vec<ArmPose>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    sent: sent.clone(),
                    budget,
                },
                sent,
            )
        }
    }

    impl Transport for MockTransport {
        fn send(&mut self, pose: &ArmPose) -> Result<(), TransportError> {
            let mut sent = self.sent.lock().unwrap();
            if sent.len() >= self.budget {
                return Err(TransportError::Write(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "unplugged",
                )));
            }
            sent.push(*pose);
            Ok(())
        }
    }

    fn labels(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn drain(rx: &Receiver<WorkerMessage>) -> Vec<WorkerEvent> {
        rx.try_iter().map(|m| m.event).collect()
    }

    #[test]
    fn runs_until_input_is_exhausted() {
        let (transport, sent) = MockTransport::new(usize::MAX);
        let (tx, rx) = channel();
        let exit = run_worker(
            WorkerId::next(),
            VoiceControl::new(Devices::default()),
            labels(&["up", "open", "right"]),
            transport,
            &tx,
            &RunFlag::new(),
        );
        assert_eq!(exit, WorkerExit::InputExhausted);
        assert_eq!(
            sent.lock().unwrap().iter().map(|p| p.angles()).collect::<Vec<_>>(),
            vec![[90, 10, 175, 100], [90, 120, 175, 100], [175, 120, 170, 100]]
        );

        let events = drain(&rx);
        assert_eq!(events.len(), 4);
        assert!(matches!(events[3], WorkerEvent::Stopped));
    }

    #[test]
    fn write_failure_faults_once_and_stops_writing() {
        let (transport, sent) = MockTransport::new(1);
        let (tx, rx) = channel();
        let flag = RunFlag::new();
        let exit = run_worker(
            WorkerId::next(),
            VoiceControl::new(Devices::default()),
            labels(&["up", "down", "left", "right"]),
            transport,
            &tx,
            &flag,
        );
        assert_eq!(exit, WorkerExit::Faulted);
        assert!(!flag.is_running());
        assert_eq!(sent.lock().unwrap().len(), 1);

        let events = drain(&rx);
        let faults = events
            .iter()
            .filter(|e| matches!(e, WorkerEvent::Fault(Fault::TransportWrite(_))))
            .count();
        assert_eq!(faults, 1);
        assert!(matches!(events.last(), Some(WorkerEvent::Stopped)));
    }

    #[test]
    fn gesture_write_failure_faults_once() {
        let (transport, sent) = MockTransport::new(1);
        let (tx, rx) = channel();
        let flag = RunFlag::new();
        let frames: Vec<Frame> = [0, 1, 2, 3, 0]
            .into_iter()
            .map(|class| {
                let bbox = BoundingBox::new(290.0, 210.0, 350.0, 270.0);
                Frame::new(vec![Detection::new(class, 0.9, bbox)], 5.0)
            })
            .collect();
        let exit = run_worker(
            WorkerId::next(),
            AutomaticGestures::new(Devices::default(), WORKING_ENVELOPE),
            frames,
            transport,
            &tx,
            &flag,
        );
        assert_eq!(exit, WorkerExit::Faulted);
        assert!(!flag.is_running());
        assert_eq!(
            sent.lock().unwrap().iter().map(|p| p.angles()).collect::<Vec<_>>(),
            vec![[90, 10, 70, 110]]
        );

        let events = drain(&rx);
        let faults = events
            .iter()
            .filter(|e| matches!(e, WorkerEvent::Fault(Fault::TransportWrite(_))))
            .count();
        assert_eq!(faults, 1);
        assert_eq!(events.len(), 3);
        assert!(matches!(events.last(), Some(WorkerEvent::Stopped)));
    }

    #[test]
    fn abort_sentinel_stops_the_worker() {
        let (transport, sent) = MockTransport::new(usize::MAX);
        let (tx, rx) = channel();
        let exit = run_worker(
            WorkerId::next(),
            VoiceControl::new(Devices::default()),
            labels(&["up", "alternative_stop_flag", "down"]),
            transport,
            &tx,
            &RunFlag::new(),
        );
        assert_eq!(exit, WorkerExit::Faulted);
        assert_eq!(sent.lock().unwrap().len(), 1);
        assert!(drain(&rx)
            .iter()
            .any(|e| matches!(e, WorkerEvent::Fault(Fault::AbortRequested))));
    }

    #[test]
    fn lowered_flag_means_no_writes() {
        let (transport, sent) = MockTransport::new(usize::MAX);
        let (tx, _rx) = channel();
        let flag = RunFlag::new();
        flag.lower();
        let exit = run_worker(
            WorkerId::next(),
            VoiceControl::new(Devices::default()),
            labels(&["up"]),
            transport,
            &tx,
            &flag,
        );
        assert_eq!(exit, WorkerExit::Stopped);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn stop_joins_a_spawned_worker() {
        let (transport, _sent) = MockTransport::new(usize::MAX);
        let (tx, rx) = channel();
        let endless = std::iter::repeat_with(|| {
            thread::sleep(std::time::Duration::from_millis(1));
            "up".to_owned()
        });
        let mut handle = spawn_worker(
            VoiceControl::new(Devices::default()),
            endless,
            transport,
            tx,
            RunFlag::new(),
        );
        assert_eq!(handle.name(), "VoiceControl");
        assert_eq!(rx.recv().map(|m| m.worker), Ok(handle.id()));
        assert_eq!(handle.stop(), Some(WorkerExit::Stopped));
        assert!(!handle.is_running());
        assert!(rx
            .try_iter()
            .any(|m| m.worker == handle.id() && matches!(m.event, WorkerEvent::Stopped)));
    }
}
