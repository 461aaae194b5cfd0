//! Cancellable, optionally time-limited chunk reader

use super::ByteSource;
use crate::{
    error::{TransportError, TransportResult},
    session::CancellationToken,
};
use bytes::Bytes;
use std::time::Duration;

/// Result of one pull
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// Next body chunk
    Chunk(Bytes),
    /// Body ended cleanly
    End,
    /// Cancellation observed; the source was not polled to completion
    Cancelled,
    /// Source reported an error
    Failed(TransportError),
    /// No chunk within the idle timeout
    TimedOut(Duration),
}

/// Wraps a [`ByteSource`] with cooperative cancellation.
///
/// The token is checked before every pull and raced against the pull
/// itself, so a stalled connection never delays cancellation. A chunk that
/// resolves after cancellation is dropped, not returned.
#[derive(Debug)]
pub struct ByteStreamReader<S> {
    source: S,
    cancel: CancellationToken,
    idle_timeout: Option<Duration>,
}

impl<S: ByteSource> ByteStreamReader<S> {
    /// Create a reader over `source`
    pub fn new(source: S, cancel: CancellationToken, idle_timeout: Option<Duration>) -> Self {
        Self {
            source,
            cancel,
            idle_timeout,
        }
    }

    /// Pull the next non-empty chunk
    pub async fn next(&mut self) -> ReadOutcome {
        loop {
            if self.cancel.is_cancelled() {
                return ReadOutcome::Cancelled;
            }

            let Self {
                source,
                cancel,
                idle_timeout,
            } = self;
            let pulled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return ReadOutcome::Cancelled,
                pulled = pull(source, *idle_timeout) => pulled,
            };

            if self.cancel.is_cancelled() {
                return ReadOutcome::Cancelled;
            }

            match pulled {
                Ok(Ok(Some(chunk))) if chunk.is_empty() => continue,
                Ok(Ok(Some(chunk))) => return ReadOutcome::Chunk(chunk),
                Ok(Ok(None)) => return ReadOutcome::End,
                Ok(Err(e)) => return ReadOutcome::Failed(e),
                Err(limit) => return ReadOutcome::TimedOut(limit),
            }
        }
    }
}

async fn pull<S: ByteSource>(
    source: &mut S,
    idle_timeout: Option<Duration>,
) -> Result<TransportResult<Option<Bytes>>, Duration> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, source.next_chunk())
            .await
            .map_err(|_| limit),
        None => Ok(source.next_chunk().await),
    }
}
