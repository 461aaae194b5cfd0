//! Logical query slot holding at most one live session

use super::{CancellationToken, SessionReport, SnapshotSink, StreamSession};
use crate::{
    config::RankStreamConfig,
    error::Result,
    transport::{QueryRequest, QueryTransport},
};
use parking_lot::Mutex;
use rankstream_domain::{AggregateState, SessionId};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error};

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
    handle: Option<JoinHandle<SessionReport>>,
}

/// Single query surface for a caller such as a search page.
///
/// Submitting a new query cancels the previous session before the new one
/// starts, so subscribers never see a superseded session's data. Snapshots
/// are published through a `watch` channel.
pub struct QuerySlot<T: QueryTransport> {
    transport: Arc<T>,
    config: Arc<RankStreamConfig>,
    state_tx: Arc<watch::Sender<AggregateState>>,
    active: Mutex<Option<ActiveSession>>,
}

impl<T: QueryTransport> QuerySlot<T> {
    /// Create a slot after validating `config`
    pub fn new(transport: Arc<T>, config: RankStreamConfig) -> Result<Self> {
        config.validate()?;
        let (state_tx, _) = watch::channel(AggregateState::default());
        Ok(Self {
            transport,
            config: Arc::new(config),
            state_tx: Arc::new(state_tx),
            active: Mutex::new(None),
        })
    }

    /// Start a session for `query`, superseding any running one.
    ///
    /// Blank queries are ignored and return `None`. Must be called from
    /// within a Tokio runtime.
    pub fn submit(&self, query: &str) -> Option<SessionId> {
        if query.trim().is_empty() {
            debug!("Ignoring blank query");
            return None;
        }

        let mut active = self.active.lock();
        if let Some(previous) = active.take()
            && previous.cancel.cancel()
        {
            debug!(session_id = %previous.id, "Superseded session cancelled");
        }

        self.state_tx.send_replace(AggregateState::loading(
            self.config.session.initial_status.clone(),
        ));

        let sink: Arc<dyn SnapshotSink> = self.state_tx.clone();
        let session = StreamSession::new(
            Arc::clone(&self.transport),
            QueryRequest::new(query),
            &self.config,
            sink,
        );
        let id = session.id();
        let cancel = session.cancellation_token();
        let handle = tokio::spawn(session.run());

        *active = Some(ActiveSession {
            id,
            cancel,
            handle: Some(handle),
        });
        Some(id)
    }

    /// Cancel the active session.
    ///
    /// The last published snapshot stays as it was, including its
    /// `is_loading` flag: a cancelled session never publishes a terminal
    /// snapshot. Returns `false` when there was nothing left to cancel.
    pub fn cancel(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(active) => active.cancel.cancel(),
            None => false,
        }
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<AggregateState> {
        self.state_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> AggregateState {
        self.state_tx.borrow().clone()
    }

    /// Identifier of the most recently submitted session
    pub fn active_session(&self) -> Option<SessionId> {
        self.active.lock().as_ref().map(|active| active.id)
    }

    /// Wait for the most recently submitted session to finish.
    ///
    /// Returns `None` when nothing was submitted or the report was already
    /// taken by an earlier call.
    pub async fn wait(&self) -> Option<SessionReport> {
        let handle = {
            let mut active = self.active.lock();
            active.as_mut()?.handle.take()?
        };
        match handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(error = %e, "Session task did not complete");
                None
            }
        }
    }
}

impl<T: QueryTransport> Drop for QuerySlot<T> {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().as_ref() {
            active.cancel.cancel();
        }
    }
}
