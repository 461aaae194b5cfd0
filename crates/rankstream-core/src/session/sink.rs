//! Snapshot delivery seam between a session and its subscribers

use rankstream_domain::AggregateState;
use std::fmt;
use tokio::sync::watch;

/// Receiver of aggregate snapshots.
///
/// Called synchronously while the session holds its cancellation gate, so
/// implementations must not block on the session itself.
pub trait SnapshotSink: Send + Sync {
    /// Deliver a snapshot
    fn deliver(&self, snapshot: &AggregateState);
}

impl SnapshotSink for watch::Sender<AggregateState> {
    fn deliver(&self, snapshot: &AggregateState) {
        self.send_replace(snapshot.clone());
    }
}

/// Closure-backed sink
pub struct FnSink<F>(F);

impl<F> FnSink<F>
where
    F: Fn(&AggregateState) + Send + Sync,
{
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

impl<F> SnapshotSink for FnSink<F>
where
    F: Fn(&AggregateState) + Send + Sync,
{
    fn deliver(&self, snapshot: &AggregateState) {
        (self.0)(snapshot)
    }
}
