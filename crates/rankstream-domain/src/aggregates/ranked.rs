//! Ranked view of all results seen so far
//!
//! Results arrive in completion order, not score order. The aggregator keeps
//! them sorted by score descending at every observable point, with ties
//! resolved by arrival order, and never holds two entries with the same id.

use crate::{entities::RankedItem, value_objects::ItemId};
use ahash::AHashSet;

/// What an [`RankedAggregator::insert`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New id placed at `position`
    Inserted {
        /// Index in the ranked list
        position: usize,
    },
    /// Existing id replaced and moved
    Updated {
        /// Index before the update
        from: usize,
        /// Index after the update
        to: usize,
    },
}

impl InsertOutcome {
    /// Final index of the inserted or updated item
    pub fn position(self) -> usize {
        match self {
            Self::Inserted { position } => position,
            Self::Updated { to, .. } => to,
        }
    }
}

/// Score-ordered, id-unique collection of results plus the current status line
#[derive(Debug, Clone, Default)]
pub struct RankedAggregator {
    results: Vec<RankedItem>,
    known: AHashSet<ItemId>,
    status: Option<String>,
    next_arrival: u64,
}

impl RankedAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `item` in ranked position.
    ///
    /// A repeated id replaces the stored score and payload and is re-ranked;
    /// it keeps the arrival rank of its first appearance for tie-breaking.
    pub fn insert(&mut self, item: RankedItem) -> InsertOutcome {
        let existing = if self.known.contains(item.id()) {
            self.results
                .iter()
                .position(|existing| existing.id() == item.id())
        } else {
            None
        };

        match existing {
            Some(from) => {
                let mut existing = self.results.remove(from);
                existing.replace_content(item.score(), item.payload_arc());
                let to = self.insertion_point(&existing);
                self.results.insert(to, existing);
                InsertOutcome::Updated { from, to }
            }
            None => {
                let arrival = self.next_arrival;
                self.next_arrival += 1;
                self.known.insert(item.id().clone());

                let item = item.with_arrival(arrival);
                let position = self.insertion_point(&item);
                self.results.insert(position, item);
                InsertOutcome::Inserted { position }
            }
        }
    }

    fn insertion_point(&self, item: &RankedItem) -> usize {
        self.results
            .partition_point(|existing| existing.ranks_before(item))
    }

    /// Replace the current status line
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Remove the current status line
    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Current status line
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Results in rank order
    pub fn results(&self) -> &[RankedItem] {
        &self.results
    }

    /// Look up a result by id
    pub fn get(&self, id: &ItemId) -> Option<&RankedItem> {
        if !self.known.contains(id) {
            return None;
        }
        self.results.iter().find(|item| item.id() == id)
    }

    /// Number of distinct results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when no result has been inserted
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Drop all results and the status line
    pub fn clear(&mut self) {
        self.results.clear();
        self.known.clear();
        self.status = None;
        self.next_arrival = 0;
    }
}
