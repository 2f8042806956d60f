use std::fmt;

#[derive(Debug)]
pub enum RemoteError {
    /// No API key configured; no request was sent.
    MissingCredential,
    EmptyPrompt,
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The service answered, but not with a usable point cloud.
    Malformed(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::MissingCredential => write!(f, "API key missing"),
            RemoteError::EmptyPrompt => write!(f, "prompt is empty"),
            RemoteError::Http(e) => write!(f, "HTTP error: {e}"),
            RemoteError::Status { status, body } => {
                write!(f, "shape service returned {status}: {body}")
            }
            RemoteError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemoteError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Http(e)
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Malformed(e.to_string())
    }
}

impl From<swarm_core::Error> for RemoteError {
    fn from(e: swarm_core::Error) -> Self {
        RemoteError::Malformed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
