//! # rankstream
//!
//! Streaming decode-and-rank engine for long-running analytic queries.
//! A backend answers a natural-language query with a chunked NDJSON body of
//! progress messages and scored results; this crate turns that body into a
//! continuously updated, score-ranked view while the backend is still
//! computing.
//!
//! Data flows one way:
//!
//! ```text
//! transport chunks → LineAssembler → EventDecoder → RankedAggregator → snapshot
//! ```
//!
//! [`QuerySlot`] is the usual entry point: it owns one live
//! [`StreamSession`] at a time and publishes [`AggregateState`] snapshots
//! through a `tokio::sync::watch` channel.

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;

// Domain exports
pub use rankstream_domain::{
    AggregateState, DomainError, DomainResult, ErrorKind, InsertOutcome, ItemId, MalformedReason,
    RankedAggregator, RankedItem, Score, SessionFailure, SessionId, SessionState, StreamEvent,
    aggregates::PayloadAdapter,
};

// Pipeline exports
pub use codec::{EventDecoder, LineAssembler, Lines};
pub use config::{DecoderConfig, NotifyMode, RankStreamConfig, SessionConfig, TransportConfig};
pub use error::{Error, Result, TransportError, TransportResult};
pub use session::{
    CancellationToken, FnSink, QuerySlot, SessionReport, SessionStats, SnapshotSink,
    StreamSession,
};
#[cfg(feature = "http-client")]
pub use transport::{HttpByteSource, HttpTransport};
pub use transport::{
    ByteSource, ByteStreamReader, MemorySource, MemoryTransport, QueryRequest, QueryTransport,
    ReadOutcome, ScriptStep,
};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        AggregateState, CancellationToken, Error, ErrorKind, PayloadAdapter, QuerySlot,
        QueryTransport, RankStreamConfig, RankedItem, Result, SessionId, SessionReport,
        SessionState, SnapshotSink, StreamSession,
    };
    #[cfg(feature = "http-client")]
    pub use super::HttpTransport;
}
