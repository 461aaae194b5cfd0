//! Error types for rankstream operations

use rankstream_domain::{ErrorKind, SessionFailure};
use std::time::Duration;

/// Result type alias for rankstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for byte source operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Failures raised by a transport while opening or reading a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Request could not be sent or no response headers arrived
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Backend answered with a non-success status
    #[error("Backend responded with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Reading the response body failed mid-stream
    #[error("Response body read failed: {0}")]
    Body(String),

    /// Connection closed before the backend finished
    #[error("Stream closed prematurely: {0}")]
    PrematureClose(String),
}

impl TransportError {
    /// Create a connect error
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Create a body read error
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body(message.into())
    }
}

/// Main error type for rankstream operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No chunk arrived within the idle timeout
    #[error("No data received for {}ms", .0.as_millis())]
    IdleTimeout(Duration),

    /// A line, terminated or still pending, went past the line limit
    #[error("Line exceeds {limit} bytes")]
    LineTooLong {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Failure category for errors that end a session; `None` for errors
    /// raised before any session exists
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Transport(_) => Some(ErrorKind::Transport),
            Self::IdleTimeout(_) => Some(ErrorKind::Timeout),
            Self::LineTooLong { .. } => Some(ErrorKind::Protocol),
            Self::Config(_) => None,
        }
    }

    /// Record for the snapshot `error` field
    pub fn to_failure(&self) -> SessionFailure {
        SessionFailure::new(
            self.kind().unwrap_or(ErrorKind::Protocol),
            self.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::from(TransportError::Status { status: 502 }).kind(),
            Some(ErrorKind::Transport)
        );
        assert_eq!(
            Error::IdleTimeout(Duration::from_secs(1)).kind(),
            Some(ErrorKind::Timeout)
        );
        assert_eq!(
            Error::LineTooLong { limit: 8 }.kind(),
            Some(ErrorKind::Protocol)
        );
        assert_eq!(Error::config("bad").kind(), None);
    }

    #[test]
    fn test_failure_carries_message() {
        let failure = Error::from(TransportError::connect("refused")).to_failure();
        assert_eq!(failure.kind, ErrorKind::Transport);
        assert_eq!(failure.message, "Connection failed: refused");
    }

    #[test]
    fn test_idle_timeout_display() {
        let err = Error::IdleTimeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "No data received for 1500ms");
    }
}
