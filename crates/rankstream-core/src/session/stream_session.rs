//! Single-query pipeline: transport → lines → events → ranked aggregate

use super::{CancellationToken, SnapshotSink};
use crate::{
    codec::{EventDecoder, LineAssembler},
    config::{NotifyMode, RankStreamConfig, SessionConfig},
    error::Error,
    transport::{ByteStreamReader, QueryRequest, QueryTransport, ReadOutcome},
};
use chrono::{DateTime, Utc};
use rankstream_domain::{
    AggregateState, InsertOutcome, RankedAggregator, SessionFailure, SessionId, SessionState,
    StreamEvent,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Longest excerpt of a malformed line written to the log
const LOG_EXCERPT_CHARS: usize = 120;

/// Counters collected while a session runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub bytes_received: u64,
    pub chunks_received: u64,
    pub lines_decoded: u64,
    pub results_applied: u64,
    pub status_updates: u64,
    pub malformed_lines: u64,
}

/// Outcome of [`StreamSession::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    /// Terminal state reached
    pub state: SessionState,
    pub stats: SessionStats,
    /// Set when `state` is [`SessionState::Failed`]
    pub failure: Option<SessionFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one query from request to a terminal state.
///
/// Every mutation of the aggregate and every snapshot delivery runs under
/// the session's [`CancellationToken`] gate. After the token is cancelled
/// the sink never hears from this session again, even if a read that was
/// already in flight resolves.
pub struct StreamSession<T: QueryTransport> {
    id: SessionId,
    transport: Arc<T>,
    request: QueryRequest,
    config: SessionConfig,
    cancel: CancellationToken,
    sink: Arc<dyn SnapshotSink>,
    state: SessionState,
    aggregator: RankedAggregator,
    assembler: LineAssembler,
    decoder: EventDecoder,
    stats: SessionStats,
    failure: Option<SessionFailure>,
}

impl<T: QueryTransport> StreamSession<T> {
    /// Create an idle session for `request`
    pub fn new(
        transport: Arc<T>,
        request: QueryRequest,
        config: &RankStreamConfig,
        sink: Arc<dyn SnapshotSink>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            transport,
            request,
            config: config.session.clone(),
            cancel: CancellationToken::new(),
            sink,
            state: SessionState::Idle,
            aggregator: RankedAggregator::new(),
            assembler: LineAssembler::new(config.session.max_line_bytes),
            decoder: EventDecoder::new(&config.decoder),
            stats: SessionStats::default(),
            failure: None,
        }
    }

    /// Session identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Token that cancels this session; clone it before calling [`run`](Self::run)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the pipeline to a terminal state
    pub async fn run(mut self) -> SessionReport {
        let started_at = Utc::now();
        info!(session_id = %self.id, query = %self.request.query, "Starting session");

        self.execute().await;

        let report = SessionReport {
            session_id: self.id,
            state: self.state,
            stats: self.stats,
            failure: self.failure,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            session_id = %report.session_id,
            state = %report.state,
            results = report.stats.results_applied,
            malformed = report.stats.malformed_lines,
            "Session finished"
        );
        report
    }

    async fn execute(&mut self) {
        let cancel = self.cancel.clone();

        let started = cancel.run_if_active(|| {
            if !self.transition(SessionState::Requesting) {
                return false;
            }
            if let Some(status) = self.config.initial_status.clone() {
                self.aggregator.set_status(status);
            }
            self.publish(true, false);
            true
        });
        match started {
            None => return self.on_cancelled(),
            Some(false) => return,
            Some(true) => {}
        }

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = self.transport.open(&self.request) => Some(opened),
        };
        let source = match opened {
            None => return self.on_cancelled(),
            Some(Err(e)) => return self.fail(e.into()),
            Some(Ok(source)) => source,
        };

        let mut reader = ByteStreamReader::new(source, cancel, self.config.idle_timeout());
        loop {
            match reader.next().await {
                ReadOutcome::Chunk(chunk) => {
                    self.stats.chunks_received += 1;
                    self.stats.bytes_received += chunk.len() as u64;
                    debug!(session_id = %self.id, bytes = chunk.len(), "Chunk received");

                    if self.state == SessionState::Requesting
                        && !self.transition(SessionState::Streaming)
                    {
                        return;
                    }
                    if !self.apply_chunk(&chunk) {
                        return;
                    }
                }
                ReadOutcome::End => return self.complete(),
                ReadOutcome::Cancelled => return self.on_cancelled(),
                ReadOutcome::Failed(e) => return self.fail(e.into()),
                ReadOutcome::TimedOut(limit) => return self.fail(Error::IdleTimeout(limit)),
            }
        }
    }

    /// Feed one chunk through the pipeline; `false` once the session ended
    fn apply_chunk(&mut self, chunk: &[u8]) -> bool {
        let lines = match self.assembler.feed(chunk) {
            Ok(lines) => lines,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };

        let cancel = self.cancel.clone();
        let per_line = self.config.notify == NotifyMode::PerLine;
        let mut dirty = false;

        for line in &lines {
            let applied = cancel.run_if_active(|| {
                let changed = self.apply_line(line);
                if changed && per_line {
                    self.publish(true, false);
                }
                changed
            });
            match applied {
                Some(changed) => dirty |= changed,
                None => {
                    self.on_cancelled();
                    return false;
                }
            }
        }

        if dirty && !per_line && cancel.run_if_active(|| self.publish(true, false)).is_none() {
            self.on_cancelled();
            return false;
        }
        true
    }

    /// Decode and apply one line; `true` when the aggregate changed
    fn apply_line(&mut self, line: &str) -> bool {
        self.stats.lines_decoded += 1;
        match self.decoder.decode(line) {
            StreamEvent::Status { message } => {
                self.stats.status_updates += 1;
                self.aggregator.set_status(message);
                true
            }
            StreamEvent::Result(item) => {
                self.stats.results_applied += 1;
                let id = item.id().clone();
                match self.aggregator.insert(item) {
                    InsertOutcome::Inserted { position } => {
                        trace!(session_id = %self.id, %id, position, "Result ranked");
                    }
                    InsertOutcome::Updated { from, to } => {
                        debug!(session_id = %self.id, %id, from, to, "Result updated in place");
                    }
                }
                true
            }
            StreamEvent::Malformed { raw_text, reason } => {
                self.stats.malformed_lines += 1;
                warn!(
                    session_id = %self.id,
                    %reason,
                    line = %excerpt(&raw_text),
                    "Skipping malformed line"
                );
                false
            }
        }
    }

    fn complete(&mut self) {
        let remainder = match self.assembler.finalize() {
            Ok(remainder) => remainder,
            Err(e) => return self.fail(e),
        };

        let cancel = self.cancel.clone();
        let finished = cancel.run_if_active(|| {
            if let Some(line) = remainder {
                self.apply_line(&line);
            }
            self.aggregator.clear_status();
            if self.transition(SessionState::Completed) {
                self.publish(false, true);
            }
        });
        if finished.is_none() {
            self.on_cancelled();
        }
    }

    fn fail(&mut self, err: Error) {
        let failure = err.to_failure();
        let cancel = self.cancel.clone();
        let failed = cancel.run_if_active(|| {
            self.aggregator.clear_status();
            self.failure = Some(failure);
            if self.transition(SessionState::Failed) {
                self.publish(false, false);
            }
        });
        match failed {
            Some(()) => error!(session_id = %self.id, error = %err, "Session failed"),
            None => self.on_cancelled(),
        }
    }

    fn on_cancelled(&mut self) {
        self.assembler.reset();
        self.transition(SessionState::Cancelled);
    }

    fn transition(&mut self, next: SessionState) -> bool {
        match self.state.transition(next) {
            Ok(state) => {
                debug!(
                    session_id = %self.id,
                    from = %self.state,
                    to = %state,
                    "Session transition"
                );
                self.state = state;
                true
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Rejected session transition");
                false
            }
        }
    }

    fn publish(&self, is_loading: bool, is_complete: bool) {
        let snapshot = AggregateState::capture(
            &self.aggregator,
            is_loading,
            is_complete,
            self.failure.clone(),
        );
        self.sink.deliver(&snapshot);
    }
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(LOG_EXCERPT_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
