//! Transport seam: issuing the query and pulling response bytes
//!
//! [`QueryTransport`] opens one response per session and hands back a
//! [`ByteSource`]; [`ByteStreamReader`] wraps that source with cancellation
//! and the optional idle timeout.

#[cfg(feature = "http-client")]
pub mod http;
pub mod memory;
pub mod reader;

use crate::error::TransportResult;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::future::Future;

#[cfg(feature = "http-client")]
pub use http::{HttpByteSource, HttpTransport};
pub use memory::{ChunkSender, MemorySource, MemoryTransport, ScriptStep};
pub use reader::{ByteStreamReader, ReadOutcome};

/// Body of a sourcing query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Natural-language query text
    pub query: String,
}

impl QueryRequest {
    /// Create a request for `query`
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Pull-based response body
pub trait ByteSource: Send {
    /// Next chunk of the body, `Ok(None)` at end of stream
    fn next_chunk(&mut self) -> impl Future<Output = TransportResult<Option<Bytes>>> + Send;
}

/// Issues a query and returns its streaming body
pub trait QueryTransport: Send + Sync + 'static {
    /// Body type produced by this transport
    type Source: ByteSource + 'static;

    /// Send `request`; resolves once response headers are in
    fn open(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = TransportResult<Self::Source>> + Send;
}
