mod gui;

use std::collections::VecDeque;

use gesture_arm::config::{ControlMethod, SessionConfig};
use gesture_arm::detection::WorkingEnvelope;
use gesture_arm::dummy_detector::DummyDetector;
use gesture_arm::modality::StatusReport;
use gesture_arm::session::{InputSource, Session};
use gesture_arm::transport::NullTransport;
use gesture_arm::worker::WorkerEvent;
use gui::engage_gui;
use log::error;

/// How many past hand positions stay on the chart.
const TRAIL: usize = 40;

fn main() {
    env_logger::init();

    let config = SessionConfig {
        control_method: ControlMethod::ManualGestures,
        ..SessionConfig::default()
    };
    let envelope = WorkingEnvelope::default();
    let (session, events) = Session::new(config);
    let mut session = session.with_envelope(envelope);
    let detector = DummyDetector::builder().step(20.0).build();
    if let Err(e) = session.start_with_transport(InputSource::frames(detector), Box::new(NullTransport)) {
        error!("{}", e);
        return;
    }

    let mut trail = VecDeque::with_capacity(TRAIL);
    let mut latest = String::new();
    let result = engage_gui(
        envelope,
        Box::new(move || {
            for message in events.try_iter() {
                if let WorkerEvent::Status(StatusReport::Manual(status)) = message.event {
                    if let Some((x, y)) = status.position {
                        if trail.len() == TRAIL {
                            trail.pop_front();
                        }
                        trail.push_back((x as f64, y as f64));
                    }
                    latest = format!(
                        "hand: {}  direction: {}  in range: {}  {} fps",
                        status.state, status.direction, status.in_range, status.fps
                    );
                }
            }
            (trail.iter().copied().collect(), latest.clone())
        }),
    );
    if let Err(e) = result {
        error!("{}", e);
    }

    session.stop();
}
