//! Ranked result entity

use crate::value_objects::{ItemId, Score};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// One result in the ranked view.
///
/// The payload is the backend's record verbatim. It is shared behind an
/// `Arc` so that publishing a snapshot after every line clones pointers, not
/// JSON trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    id: ItemId,
    score: Score,
    payload: Arc<JsonValue>,
    /// Arrival rank within the owning aggregate; breaks score ties.
    #[serde(default)]
    arrival: u64,
}

impl RankedItem {
    /// Create a new item that has not yet been placed in an aggregate
    pub fn new(id: ItemId, score: Score, payload: JsonValue) -> Self {
        Self {
            id,
            score,
            payload: Arc::new(payload),
            arrival: 0,
        }
    }

    /// Identity of the result
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Backend-assigned score
    pub fn score(&self) -> Score {
        self.score
    }

    /// Opaque backend payload
    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    /// Shared handle to the payload
    pub fn payload_arc(&self) -> Arc<JsonValue> {
        Arc::clone(&self.payload)
    }

    /// Position in arrival order, assigned by the aggregate on first insert
    pub fn arrival(&self) -> u64 {
        self.arrival
    }

    pub(crate) fn with_arrival(mut self, arrival: u64) -> Self {
        self.arrival = arrival;
        self
    }

    pub(crate) fn replace_content(&mut self, score: Score, payload: Arc<JsonValue>) {
        self.score = score;
        self.payload = payload;
    }

    /// True when `self` ranks strictly ahead of `other`
    pub fn ranks_before(&self, other: &RankedItem) -> bool {
        self.score > other.score || (self.score == other.score && self.arrival < other.arrival)
    }
}
