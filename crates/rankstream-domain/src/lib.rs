//! rankstream Domain Layer - Pure Business Logic
//!
//! This crate contains the pure domain logic for rankstream: the typed events
//! decoded from a result stream, the validated score and identity value
//! objects, the ranked aggregate and the session lifecycle state machine.
//!
//! Nothing in here performs I/O. The async pipeline that feeds these types
//! lives in the `rankstream` crate.
//!
//! ## Architecture
//!
//! - **Value Objects**: Immutable, validated concepts (`Score`, `ItemId`, `SessionId`)
//! - **Entities**: Objects with identity (`RankedItem`)
//! - **Events**: Decoded stream events and session states
//! - **Aggregates**: `RankedAggregator` and the outward `AggregateState` snapshot

#![warn(missing_docs)]

pub mod aggregates;
pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export core types
pub use aggregates::{AggregateState, InsertOutcome, RankedAggregator, SessionFailure};
pub use entities::RankedItem;
pub use events::{ErrorKind, MalformedReason, SessionState, StreamEvent};
pub use value_objects::{ItemId, Score, SessionId};

/// Domain Result type
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-specific errors
///
/// All domain errors are value types with no external dependencies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum DomainError {
    /// Invalid state transition attempted
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Score is not a finite number
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// Identity is empty or otherwise unusable
    #[error("Invalid item id: {0}")]
    InvalidItemId(String),
}

impl DomainError {
    /// Create an invalid state transition error
    pub fn invalid_transition(from: SessionState, to: SessionState) -> Self {
        Self::InvalidStateTransition(format!("{from} -> {to}"))
    }
}
