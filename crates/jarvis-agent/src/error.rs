//! Error types for jarvis-agent

use thiserror::Error;

/// Result type alias using jarvis-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a conversation
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the gateway layer
    #[error(transparent)]
    Ai(#[from] jarvis_ai::Error),

    /// Neither opener could hand the URL to the platform
    #[error("Failed to open {url}: {reason}")]
    OpenFailed { url: String, reason: String },

    /// Conversation persistence failed
    #[error("Store error: {0}")]
    Store(String),

    /// Nothing to send: no text and no image
    #[error("Message is empty")]
    EmptyInput,

    /// A turn is already in flight
    #[error("A response is already being generated")]
    Busy,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a user-initiated abort
    pub fn is_abort(&self) -> bool {
        match self {
            Error::Ai(e) => e.is_abort(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Store(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Store(e.to_string())
    }
}
