use std::fmt;

use crate::gesture::FrameError;

#[derive(Debug)]
pub enum Error {
    /// A target buffer whose length differs from the particle buffer.
    LengthMismatch { expected: usize, actual: usize },
    UnknownShape(String),
    UnknownDensify(String),
    InvalidColor(String),
    /// External point-cloud payload that could not be used.
    MalformedPoints(String),
    Frame(FrameError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LengthMismatch { expected, actual } => {
                write!(f, "target buffer has {actual} points, expected {expected}")
            }
            Error::UnknownShape(name) => write!(f, "unknown shape: {name}"),
            Error::UnknownDensify(name) => write!(f, "unknown densify strategy: {name}"),
            Error::InvalidColor(s) => write!(f, "invalid color: {s}"),
            Error::MalformedPoints(msg) => write!(f, "malformed point cloud: {msg}"),
            Error::Frame(e) => write!(f, "frame source: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedPoints(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
