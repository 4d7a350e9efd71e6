//! The session settings and the `setup.txt` file they are kept in.
//!
//! The file is a list of `key=value` lines:
//!
//! ```text
//! com_port=3
//! capture_device=0
//! control_method=Manual gestures
//! api_key=No-key
//! ```
//!
//! Unknown keys and blank lines are ignored; keys that are missing keep
//! their default value.

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, space0},
    combinator::{all_consuming, map, rest},
    sequence::{delimited, separated_pair},
    Finish, IResult,
};
use std::{
    borrow::Cow,
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Default name of the setup file.
pub const SETUP_FILE: &str = "setup.txt";

/// The three ways of controlling the arm.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMethod {
    ManualGestures,
    AutomaticGestures,
    Voice,
}

impl ControlMethod {
    /// Every control method, in menu order.
    pub const ALL: [ControlMethod; 3] = [
        ControlMethod::ManualGestures,
        ControlMethod::AutomaticGestures,
        ControlMethod::Voice,
    ];

    /// The name used in the setup file.
    pub fn name(&self) -> &'static str {
        match self {
            ControlMethod::ManualGestures => "Manual gestures",
            ControlMethod::AutomaticGestures => "Automatic gestures",
            ControlMethod::Voice => "Voice",
        }
    }
}

impl fmt::Display for ControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned for a control method name we do not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownControlMethod(pub String);

impl fmt::Display for UnknownControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown control method {:?}, expected one of: {}",
            self.0,
            ControlMethod::ALL.map(|m| m.name()).join(", ")
        )
    }
}

impl Error for UnknownControlMethod {}

impl FromStr for ControlMethod {
    type Err = UnknownControlMethod;

    /// Accepts the setup file names as well as the short forms `manual`,
    /// `automatic` and `voice`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual gestures" | "manual" | "gestures" => Ok(ControlMethod::ManualGestures),
            "automatic gestures" | "automatic" => Ok(ControlMethod::AutomaticGestures),
            "voice" => Ok(ControlMethod::Voice),
            _ => Err(UnknownControlMethod(s.to_owned())),
        }
    }
}

/// Things that can go wrong loading or saving a [`SessionConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    IoError(io::Error),
    /// A line is not of the form `key=value`.
    #[allow(missing_docs)]
    Syntax { line: usize, text: String },
    /// A known key has a value we cannot use.
    #[allow(missing_docs)]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
    /// API keys may not be empty or contain spaces.
    InvalidApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ConfigError as CE;
        let msg = match self {
            CE::IoError(error) => Cow::from(format!("io error: {}", error)),
            CE::Syntax { line, text } => {
                Cow::from(format!("line {}: expected key=value, found {:?}", line, text))
            }
            CE::InvalidValue { line, key, value } => {
                Cow::from(format!("line {}: invalid value {:?} for {}", line, value, key))
            }
            CE::InvalidApiKey => Cow::from("api key must be non-empty and contain no spaces"),
        };
        write!(f, "{}", msg)
    }
}

impl Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::IoError(value)
    }
}

/// Settings read once when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Number of the serial port the controller is on.
    pub com_port: u32,
    /// Index of the camera or microphone.
    pub capture_device: u32,
    /// Which modality to run.
    pub control_method: ControlMethod,
    /// Credential for the speech classification service.
    pub api_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            com_port: 3,
            capture_device: 0,
            control_method: ControlMethod::ManualGestures,
            api_key: "No-key".to_owned(),
        }
    }
}

/// `key = value`, with the value running to the end of the line.
fn parse_entry(s: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(
        delimited(space0, take_till1(|c: char| c == '=' || c == ' '), space0),
        char('='),
        map(rest, str::trim),
    ))(s)
}

impl SessionConfig {
    /// Parses the contents of a setup file.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (_, (key, value)) = parse_entry(line).finish().map_err(|_| ConfigError::Syntax {
                line: line_no,
                text: line.to_owned(),
            })?;
            let invalid = || ConfigError::InvalidValue {
                line: line_no,
                key: key.to_owned(),
                value: value.to_owned(),
            };

            match key {
                "com_port" => config.com_port = value.parse().map_err(|_| invalid())?,
                "capture_device" => config.capture_device = value.parse().map_err(|_| invalid())?,
                "control_method" => config.control_method = value.parse().map_err(|_| invalid())?,
                "api_key" => config.api_key = value.to_owned(),
                _ => {}
            }
        }

        Ok(config)
    }

    /// Reads a setup file, falling back to the defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::IoError(error)),
        }
    }

    /// Writes the settings out in setup file format, replacing any existing
    /// file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.validate()?;
        fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Checks the fields a file could not have checked for us.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() || self.api_key.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidApiKey);
        }
        Ok(())
    }

    /// Serial device for [`com_port`](Self::com_port) on this platform.
    pub fn port_path(&self) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!("COM{}", self.com_port))
        } else {
            PathBuf::from(format!("/dev/ttyUSB{}", self.com_port))
        }
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "com_port={}", self.com_port)?;
        writeln!(f, "capture_device={}", self.capture_device)?;
        writeln!(f, "control_method={}", self.control_method)?;
        writeln!(f, "api_key={}", self.api_key)
    }
}
