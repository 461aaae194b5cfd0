//! Outward-facing snapshot of a session

use crate::{aggregates::RankedAggregator, entities::RankedItem, events::ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fatal failure recorded on a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
}

impl SessionFailure {
    /// Create a failure record
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

/// Immutable view of everything a consumer may render.
///
/// A fresh value is published after every state-changing line; consumers
/// never observe a half-applied update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateState {
    /// Results, score descending, ties in arrival order
    pub results: Vec<RankedItem>,
    /// Latest progress message, if any
    pub status_message: Option<String>,
    /// True while a request is in flight.
    ///
    /// A cancelled session publishes nothing further, so its last snapshot
    /// keeps `is_loading` set; callers that cancel track that themselves.
    pub is_loading: bool,
    /// True once the stream ended cleanly
    pub is_complete: bool,
    /// Populated only when the session failed
    pub error: Option<SessionFailure>,
}

impl AggregateState {
    /// State shown right after a query is submitted
    pub fn loading(status_message: Option<String>) -> Self {
        Self {
            status_message,
            is_loading: true,
            ..Self::default()
        }
    }

    /// Capture the aggregator's current content with the given flags
    pub fn capture(
        aggregator: &RankedAggregator,
        is_loading: bool,
        is_complete: bool,
        error: Option<SessionFailure>,
    ) -> Self {
        Self {
            results: aggregator.results().to_vec(),
            status_message: aggregator.status().map(str::to_owned),
            is_loading,
            is_complete,
            error,
        }
    }

    /// True when the session failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Map every result through `adapter`, dropping the ones it rejects
    pub fn adapt<A: PayloadAdapter>(&self, adapter: &A) -> Vec<A::Output> {
        self.results
            .iter()
            .filter_map(|item| adapter.adapt(item))
            .collect()
    }
}

/// Maps an opaque result payload into a caller's display model.
///
/// The streaming core only understands identity and score; everything else a
/// backend record carries is interpreted here, outside the core.
pub trait PayloadAdapter {
    /// Display model produced for each result
    type Output;

    /// Convert one result, or `None` to hide it
    fn adapt(&self, item: &RankedItem) -> Option<Self::Output>;
}

impl<F, T> PayloadAdapter for F
where
    F: Fn(&RankedItem) -> Option<T>,
{
    type Output = T;

    fn adapt(&self, item: &RankedItem) -> Option<T> {
        self(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{ItemId, Score};
    use serde_json::json;

    #[test]
    fn test_loading_state() {
        let state = AggregateState::loading(Some("Finding candidates".into()));
        assert!(state.is_loading);
        assert!(!state.is_complete);
        assert!(state.results.is_empty());
        assert!(!state.is_failed());
    }

    #[test]
    fn test_capture_copies_results_and_status() {
        let mut agg = RankedAggregator::new();
        agg.set_status("Analyzing 2 candidates...");
        agg.insert(RankedItem::new(
            ItemId::new("c1").unwrap(),
            Score::new(72.0).unwrap(),
            json!({}),
        ));

        let state = AggregateState::capture(&agg, true, false, None);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.status_message.as_deref(), Some("Analyzing 2 candidates..."));
    }

    #[test]
    fn test_adapt_with_closure() {
        let mut agg = RankedAggregator::new();
        for (id, score, name) in [("a", 10.0, "Acme"), ("b", 20.0, "")] {
            agg.insert(RankedItem::new(
                ItemId::new(id).unwrap(),
                Score::new(score).unwrap(),
                json!({ "company": { "name": name } }),
            ));
        }
        let state = AggregateState::capture(&agg, false, true, None);

        let names = state.adapt(&|item: &RankedItem| {
            item.payload()["company"]["name"]
                .as_str()
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
        });
        assert_eq!(names, ["Acme"]);
    }

    #[test]
    fn test_failure_display() {
        let failure = SessionFailure::new(ErrorKind::Transport, "connection reset");
        assert_eq!(failure.to_string(), "transport error: connection reset");
    }
}
