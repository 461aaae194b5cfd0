//! Session lifecycle: one query from submission to a terminal state
//!
//! - [`StreamSession`] drives reader → assembler → decoder → aggregator for a
//!   single query and publishes snapshots through a [`SnapshotSink`].
//! - [`QuerySlot`] owns the single active session of a logical query slot
//!   and guarantees a superseded session can never publish again.

pub mod cancel;
pub mod sink;
pub mod slot;
pub mod stream_session;

pub use cancel::CancellationToken;
pub use sink::{FnSink, SnapshotSink};
pub use slot::QuerySlot;
pub use stream_session::{SessionReport, SessionStats, StreamSession};
