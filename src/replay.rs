//! Recorded model output, so that a session can be replayed without a
//! camera, a detection model or a speech classifier attached.
//!
//! Recordings are [ron] files holding either detection frames or voice
//! labels:
//!
//! ```text
//! Frames([
//!     (detections: [(class: 0, confidence: 0.92, bbox: (x1: 300.0, y1: 220.0, x2: 340.0, y2: 260.0))], inference_ms: 11.5),
//!     (detections: [], inference_ms: 10.9),
//! ])
//! ```
//!
//! ```text
//! Labels(["up", "open", "left", "close"])
//! ```

use crate::detection::Frame;
use crate::worker::RunFlag;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fmt,
    fs::File,
    io::{self, BufRead, Read, Write},
    path::Path,
};

/// A recorded stream of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recording {
    /// Detection model output, one entry per video frame.
    Frames(Vec<Frame>),
    /// Speech classifier output, one label per utterance.
    Labels(Vec<String>),
}

/// Errors reading or writing a [`Recording`].
#[derive(Debug)]
pub enum ReplayError {
    /// Returned when io fails when reading or writing files.
    IoError(io::Error),

    /// Returned when serialization fails.
    RonError(ron::Error),

    /// Returned when deserialization fails.
    RonSpannedError(ron::de::SpannedError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ReplayError as RE;
        let msg = match self {
            RE::IoError(error) => Cow::from(format!("io error: {}", error)),
            RE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            RE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for ReplayError {}

impl Recording {
    /// Reads a recording from the path provided.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let mut handle = File::open(path).map_err(ReplayError::IoError)?;
        Self::from_reader(&mut handle)
    }

    /// Reads a recording from any [Read]able object.
    pub fn from_reader(reader: &mut impl Read) -> Result<Self, ReplayError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(ReplayError::IoError)?;
        ron::de::from_str(&text).map_err(ReplayError::RonSpannedError)
    }

    /// Writes the recording out to the path provided.
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let mut handle = File::create(path).map_err(ReplayError::IoError)?;
        self.to_writer(&mut handle)
    }

    /// Writes the recording to any [Write]able object.
    pub fn to_writer(&self, writer: &mut impl Write) -> Result<(), ReplayError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ReplayError::RonError)?;
        writer
            .write_all(text.as_bytes())
            .map_err(ReplayError::IoError)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        match self {
            Recording::Frames(frames) => frames.len(),
            Recording::Labels(labels) => labels.len(),
        }
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads one classifier label per line, for example from a speech to text
/// helper piped into stdin. Stops at end of input, or once `flag` is
/// lowered so that a stopped session does not wait on another utterance.
pub struct LabelReader<R> {
    reader: R,
    flag: RunFlag,
}

impl<R: BufRead> LabelReader<R> {
    /// Wraps a line oriented reader.
    pub fn new(reader: R, flag: RunFlag) -> Self {
        Self { reader, flag }
    }
}

impl<R: BufRead> Iterator for LabelReader<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if !self.flag.is_running() {
                return None;
            }
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) if line.trim().is_empty() => continue,
                Ok(_) => return Some(line.trim().to_owned()),
                Err(error) => {
                    debug!("label input failed: {}", error);
                    return None;
                }
            }
        }
    }
}
