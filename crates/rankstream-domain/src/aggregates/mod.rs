//! Aggregates owned by a streaming session

pub mod ranked;
pub mod state;

pub use ranked::{InsertOutcome, RankedAggregator};
pub use state::{AggregateState, PayloadAdapter, SessionFailure};
