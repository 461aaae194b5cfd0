//! Common test utilities shared by the integration suites

#![allow(dead_code)]

use parking_lot::Mutex;
use rankstream::{
    AggregateState, FnSink, MemorySource, MemoryTransport, QueryRequest, RankStreamConfig,
    SessionReport, SnapshotSink, StreamSession,
};
use std::sync::Arc;

/// NDJSON status line
pub fn status_line(message: &str) -> String {
    format!("{{\"type\":\"status\",\"message\":\"{message}\"}}\n")
}

/// NDJSON result line keyed by a flat `id`
pub fn result_line(id: &str, score: f64) -> String {
    format!("{{\"type\":\"result\",\"data\":{{\"id\":\"{id}\",\"fitScore\":{score}}}}}\n")
}

/// NDJSON result line shaped like a sourcing backend company record
pub fn company_line(cin: &str, name: &str, score: f64) -> String {
    format!(
        "{{\"type\":\"result\",\"data\":{{\"company\":{{\"cin\":\"{cin}\",\"name\":\"{name}\"}},\"fitScore\":{score},\"rationale\":\"match\"}}}}\n"
    )
}

/// Ids of a snapshot's results in ranked order
pub fn ids(snapshot: &AggregateState) -> Vec<String> {
    snapshot
        .results
        .iter()
        .map(|item| item.id().as_str().to_owned())
        .collect()
}

/// Sink that keeps every snapshot it receives
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<AggregateState>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> Arc<dyn SnapshotSink> {
        let seen = Arc::clone(&self.seen);
        Arc::new(FnSink::new(move |snapshot: &AggregateState| {
            seen.lock().push(snapshot.clone())
        }))
    }

    pub fn snapshots(&self) -> Vec<AggregateState> {
        self.seen.lock().clone()
    }

    pub fn last(&self) -> AggregateState {
        self.seen.lock().last().cloned().expect("no snapshot recorded")
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }
}

/// Run one session against `source` and collect its snapshots
pub async fn run_session(
    source: MemorySource,
    config: &RankStreamConfig,
) -> (SessionReport, Recorder) {
    let transport = Arc::new(MemoryTransport::new().respond(source));
    let recorder = Recorder::new();
    let session = StreamSession::new(
        transport,
        QueryRequest::new("test query"),
        config,
        recorder.sink(),
    );
    (session.run().await, recorder)
}
