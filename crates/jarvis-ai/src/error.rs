//! Error types for jarvis-ai

use thiserror::Error;

/// Result type alias using jarvis-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat and image gateways
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gateway answered 429
    #[error("Rate limit exceeded. Please try again in a moment, Sir.")]
    RateLimited,

    /// Gateway answered 402
    #[error("AI credits exhausted. Please add funds to continue, Sir.")]
    QuotaExhausted,

    /// Any other non-success answer from the chat gateway
    #[error("Failed to connect to JARVIS systems (status {status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    /// The turn was cancelled by the caller
    #[error("Request aborted")]
    Aborted,

    /// Image generation produced nothing usable
    #[error("Image generation failed: {0}")]
    ImageGenerationFailed(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Classify a non-success HTTP status from the chat gateway.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            429 => Error::RateLimited,
            402 => Error::QuotaExhausted,
            _ => Error::ServiceUnavailable {
                status,
                message: body.into(),
            },
        }
    }

    /// Whether this is the expected cancellation of a turn rather than a failure.
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Aborted)
    }

    /// Text shown to the user in place of the assistant's reply.
    ///
    /// Gateway bodies are not echoed back; they are only useful in logs.
    pub fn user_message(&self) -> String {
        let reason = match self {
            Error::RateLimited | Error::QuotaExhausted => self.to_string(),
            Error::ServiceUnavailable { .. } | Error::UnexpectedResponse(_) => {
                "Failed to connect to JARVIS systems.".to_string()
            }
            Error::Http(_) => "Systems experiencing interference. Please try again.".to_string(),
            other => other.to_string(),
        };
        format!("I apologize, Sir. {}", reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_rate_limited() {
        assert!(matches!(Error::from_status(429, ""), Error::RateLimited));
    }

    #[test]
    fn test_from_status_quota() {
        assert!(matches!(Error::from_status(402, ""), Error::QuotaExhausted));
    }

    #[test]
    fn test_from_status_other_is_unavailable() {
        for status in [400, 401, 500, 503] {
            match Error::from_status(status, "boom") {
                Error::ServiceUnavailable { status: s, message } => {
                    assert_eq!(s, status);
                    assert_eq!(message, "boom");
                }
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[test]
    fn test_user_message_has_apology_prefix() {
        let msg = Error::RateLimited.user_message();
        assert!(msg.starts_with("I apologize, Sir."), "got: {}", msg);
        assert!(msg.contains("Rate limit"));

        let msg = Error::QuotaExhausted.user_message();
        assert!(msg.contains("credits exhausted"));
    }

    #[test]
    fn test_user_message_hides_gateway_body() {
        let e = Error::ServiceUnavailable {
            status: 500,
            message: "stack trace from upstream".into(),
        };
        let msg = e.user_message();
        assert!(!msg.contains("stack trace"));
        assert!(msg.contains("Failed to connect"));
    }

    #[test]
    fn test_is_abort() {
        assert!(Error::Aborted.is_abort());
        assert!(!Error::RateLimited.is_abort());
    }
}
