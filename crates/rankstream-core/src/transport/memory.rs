//! In-memory transports for replaying recorded streams and for tests

use super::{ByteSource, QueryRequest, QueryTransport};
use crate::error::{TransportError, TransportResult};
use bytes::Bytes;
use parking_lot::Mutex;
use std::{collections::VecDeque, time::Duration};
use tokio::sync::mpsc;

/// Sending half of a channel-backed [`MemorySource`]
pub type ChunkSender = mpsc::Sender<TransportResult<Bytes>>;

/// One scripted step of a [`MemorySource`]
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Yield a chunk
    Chunk(Bytes),
    /// Fail the pull
    Fail(TransportError),
    /// Sleep, then continue with the next step
    Delay(Duration),
    /// Never resolve
    Stall,
}

impl ScriptStep {
    /// Chunk step from anything byte-like
    pub fn chunk(data: impl Into<Bytes>) -> Self {
        Self::Chunk(data.into())
    }
}

/// Response body held in memory
#[derive(Debug)]
pub enum MemorySource {
    /// Fixed sequence of steps; end of stream after the last one
    Scripted(VecDeque<ScriptStep>),
    /// Chunks pushed through a [`ChunkSender`]; end of stream when it drops
    Channel(mpsc::Receiver<TransportResult<Bytes>>),
}

impl MemorySource {
    /// Source yielding `chunks` in order
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self::scripted(chunks.into_iter().map(ScriptStep::chunk))
    }

    /// Source following `steps`
    pub fn scripted(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self::Scripted(steps.into_iter().collect())
    }

    /// Source fed by the returned sender
    pub fn channel(capacity: usize) -> (ChunkSender, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::Channel(rx))
    }
}

impl ByteSource for MemorySource {
    async fn next_chunk(&mut self) -> TransportResult<Option<Bytes>> {
        match self {
            Self::Scripted(steps) => loop {
                match steps.pop_front() {
                    Some(ScriptStep::Chunk(chunk)) => return Ok(Some(chunk)),
                    Some(ScriptStep::Fail(error)) => return Err(error),
                    Some(ScriptStep::Delay(duration)) => tokio::time::sleep(duration).await,
                    Some(ScriptStep::Stall) => std::future::pending::<()>().await,
                    None => return Ok(None),
                }
            },
            Self::Channel(rx) => rx.recv().await.transpose(),
        }
    }
}

/// Transport answering each `open` with the next queued response
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: Mutex<VecDeque<TransportResult<MemorySource>>>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MemoryTransport {
    /// Transport with no queued responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn respond(self, source: MemorySource) -> Self {
        self.responses.lock().push_back(Ok(source));
        self
    }

    /// Queue a failed request
    pub fn refuse(self, error: TransportError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Queue a response after construction
    pub fn push_response(&self, source: MemorySource) {
        self.responses.lock().push_back(Ok(source));
    }

    /// Every request opened so far
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().clone()
    }
}

impl QueryTransport for MemoryTransport {
    type Source = MemorySource;

    async fn open(&self, request: &QueryRequest) -> TransportResult<MemorySource> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::connect("no response queued")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_source() {
        let mut source = MemorySource::scripted([
            ScriptStep::chunk("a"),
            ScriptStep::Fail(TransportError::body("boom")),
        ]);
        assert_eq!(source.next_chunk().await, Ok(Some(Bytes::from_static(b"a"))));
        assert_eq!(source.next_chunk().await, Err(TransportError::body("boom")));
        assert_eq!(source.next_chunk().await, Ok(None));
    }

    #[tokio::test]
    async fn test_channel_source_ends_when_sender_drops() {
        let (tx, mut source) = MemorySource::channel(4);
        tx.send(Ok(Bytes::from_static(b"x"))).await.unwrap();
        drop(tx);

        assert_eq!(source.next_chunk().await, Ok(Some(Bytes::from_static(b"x"))));
        assert_eq!(source.next_chunk().await, Ok(None));
    }

    #[tokio::test]
    async fn test_transport_records_requests() {
        let transport = MemoryTransport::new().respond(MemorySource::from_chunks(["x"]));

        assert!(transport.open(&QueryRequest::new("fintech in Mumbai")).await.is_ok());
        assert!(transport.open(&QueryRequest::new("second")).await.is_err());
        assert_eq!(
            transport.requests(),
            [QueryRequest::new("fintech in Mumbai"), QueryRequest::new("second")]
        );
    }
}
