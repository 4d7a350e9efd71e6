//! Drives the arm from the command line: `run` starts a session with the
//! configured control method, `ports` lists serial ports and `configure`
//! edits the setup file.

use clap::Parser;
use gesture_arm::{
    args::{
        ArmArgs,
        CommandTask::{Configure, Ports, Run},
        ConfigureCommand, RunCommand,
    },
    config::{ControlMethod, SessionConfig},
    dummy_detector::DummyDetector,
    gui::{port_selector, status_monitor},
    replay::{LabelReader, Recording},
    session::{InputSource, Session},
    transport::SerialTransport,
    worker::WorkerEvent,
};
use log::{error, info, warn};
use std::{
    error::Error,
    io::{self, BufReader},
    path::Path,
    process,
};

// Example:
// cargo run --bin gesture-arm -- configure --com-port 0 --method voice
// cargo run --bin gesture-arm -- run --replay session.ron --headless

fn main() {
    env_logger::init();
    let args = ArmArgs::parse();

    let result = match args.command {
        Ports => list_ports(),
        Configure(cmd) => configure(&args.setup, cmd),
        Run(cmd) => run(&args.setup, cmd),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn list_ports() -> Result<(), Box<dyn Error>> {
    let ports = SerialTransport::available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
    }
    for port in ports {
        println!("{}", port.to_string_lossy());
    }
    Ok(())
}

fn configure(setup: &Path, cmd: ConfigureCommand) -> Result<(), Box<dyn Error>> {
    let mut config = if cmd.restore_defaults {
        SessionConfig::default()
    } else {
        SessionConfig::load(setup)?
    };
    if let Some(com_port) = cmd.com_port {
        config.com_port = com_port;
    }
    if let Some(capture_device) = cmd.capture_device {
        config.capture_device = capture_device;
    }
    if let Some(method) = cmd.method {
        config.control_method = method;
    }
    if let Some(api_key) = cmd.api_key {
        config.api_key = api_key;
    }
    config.save(setup)?;
    info!("Saved {}", setup.display());
    print!("{}", config);
    Ok(())
}

fn run(setup: &Path, cmd: RunCommand) -> Result<(), Box<dyn Error>> {
    let mut config = SessionConfig::load(setup)?;
    if let Some(method) = cmd.method {
        config.control_method = method;
    }
    config.validate()?;
    let method = config.control_method;

    let (mut session, events) = Session::new(config);
    if cmd.select_port {
        match port_selector(SerialTransport::available_ports()?)? {
            Some(port) => session = session.with_port(port),
            None => return Ok(()),
        }
    } else if let Some(port) = cmd.port {
        session = session.with_port(port);
    }

    let mut headless = cmd.headless;
    let source = match (cmd.replay, method) {
        (Some(path), _) => match Recording::from_path(&path)? {
            Recording::Frames(frames) => InputSource::frames(frames),
            Recording::Labels(labels) => InputSource::labels(labels),
        },
        (None, ControlMethod::Voice) => {
            // Labels typed on stdin and the terminal UI cannot share the keyboard.
            if !headless {
                warn!("Reading voice labels from stdin, falling back to headless mode.");
                headless = true;
            }
            let flag = session.run_flag();
            InputSource::labels(LabelReader::new(BufReader::new(io::stdin()), flag))
        }
        (None, _) => {
            let mut detector = DummyDetector::builder();
            if let Some(seed) = cmd.seed {
                detector = detector.seed(seed);
            }
            InputSource::frames(detector.build())
        }
    };

    session.start(source)?;
    if headless {
        for message in events.iter() {
            match &message.event {
                WorkerEvent::Status(status) => info!("{}", status),
                WorkerEvent::Fault(fault) => warn!("{}", fault),
                WorkerEvent::Stopped => {}
            }
            if !session.handle_event(&message) {
                break;
            }
        }
    } else {
        status_monitor(&mut session, &events)?;
    }
    Ok(())
}
