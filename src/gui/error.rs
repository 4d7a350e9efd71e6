use std::{error::Error, fmt::Display, io};

/// Things that can go wrong driving the terminal.
#[derive(Debug)]
pub enum ArmGuiError {
    /// The terminal could not be set up, drawn to, or restored.
    IOError(io::Error),
    /// There is nothing to choose from.
    NoPorts,
}

impl Display for ArmGuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmGuiError::IOError(error) => write!(f, "terminal error: {}", error),
            ArmGuiError::NoPorts => write!(f, "no serial ports found"),
        }
    }
}

impl Error for ArmGuiError {}

impl From<io::Error> for ArmGuiError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}
