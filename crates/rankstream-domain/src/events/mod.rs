//! Decoded stream events and session lifecycle states

use crate::{
    DomainError, DomainResult,
    entities::RankedItem,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session state in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No request issued yet
    Idle,
    /// Request issued, waiting for the first byte
    Requesting,
    /// At least one chunk received, more may follow
    Streaming,
    /// End of stream reached without a fatal error
    Completed,
    /// Transport or protocol failure
    Failed,
    /// Terminated by the caller
    Cancelled,
}

impl SessionState {
    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Requesting)
                | (Idle, Cancelled)
                | (Requesting, Streaming)
                | (Requesting, Completed)
                | (Requesting, Failed)
                | (Requesting, Cancelled)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Streaming, Cancelled)
        )
    }

    /// Validate and return the next state
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidStateTransition`] for transitions the
    /// lifecycle does not allow.
    pub fn transition(self, next: SessionState) -> DomainResult<SessionState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_transition(self, next))
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Failure category, so callers and tests can assert on the right class of
/// problem instead of matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network failure, non-success status or premature close
    Transport,
    /// No chunk arrived within the configured idle timeout
    Timeout,
    /// The byte stream violated framing limits
    Protocol,
    /// A single line could not be decoded; never fatal
    Decode,
    /// The caller terminated the session
    Cancelled,
}

impl ErrorKind {
    /// Whether this kind ends a session in the Failed state
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout | Self::Protocol)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Decode => "decode",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Why a line was classified as malformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum MalformedReason {
    /// Line is not valid JSON
    InvalidJson(String),
    /// Line is valid JSON but not an object
    NotAnObject,
    /// Object has no `type` discriminant (or it is not a string)
    MissingDiscriminant,
    /// Discriminant names an event type this decoder does not know
    UnknownType(String),
    /// A field required by the event type is absent
    MissingField(String),
    /// A required field is present but unusable
    InvalidField {
        /// Field name or pointer
        field: String,
        /// What was wrong with it
        message: String,
    },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "invalid JSON: {message}"),
            Self::NotAnObject => f.write_str("event is not a JSON object"),
            Self::MissingDiscriminant => f.write_str("missing \"type\" discriminant"),
            Self::UnknownType(kind) => write!(f, "unknown event type {kind:?}"),
            Self::MissingField(field) => write!(f, "missing required field {field}"),
            Self::InvalidField { field, message } => write!(f, "invalid field {field}: {message}"),
        }
    }
}

/// One decoded line of the result stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Progress narration; replaces the previous status
    Status {
        /// Human-readable progress message
        message: String,
    },
    /// One ranked candidate
    Result(RankedItem),
    /// Line that could not be classified
    Malformed {
        /// The offending line, verbatim
        raw_text: String,
        /// Classification failure
        reason: MalformedReason,
    },
}

impl StreamEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Result(_) => "result",
            Self::Malformed { .. } => "malformed",
        }
    }

    /// True for the malformed variant
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
