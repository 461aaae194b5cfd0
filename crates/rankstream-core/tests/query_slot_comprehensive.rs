//! Comprehensive tests for QuerySlot
//!
//! Coverage targets:
//! - Superseding a running session
//! - Request body and blank query handling
//! - Slot-level cancel, drop and wait
//! - Adapting published snapshots

mod common;

use common::{company_line, ids, result_line};
use rankstream::{
    AggregateState, ErrorKind, MemorySource, MemoryTransport, QueryRequest, QuerySlot,
    RankStreamConfig, RankedItem, SessionConfig, SessionState, TransportError,
};
use std::{sync::Arc, time::Duration};

fn slot(transport: &Arc<MemoryTransport>) -> QuerySlot<MemoryTransport> {
    QuerySlot::new(Arc::clone(transport), RankStreamConfig::default()).unwrap()
}

#[tokio::test]
async fn test_new_query_supersedes_running_session() {
    let (first_tx, first) = MemorySource::channel(8);
    let (second_tx, second) = MemorySource::channel(8);
    let transport = Arc::new(MemoryTransport::new().respond(first).respond(second));
    let slot = slot(&transport);

    let first_id = slot.submit("first query").unwrap();
    first_tx.send(Ok(result_line("a1", 99.0).into())).await.unwrap();
    slot.subscribe()
        .wait_for(|s| ids(s) == ["a1"])
        .await
        .unwrap();

    let second_id = slot.submit("second query").unwrap();
    assert_ne!(first_id, second_id);
    assert_eq!(slot.active_session(), Some(second_id));

    let reset = slot.snapshot();
    assert!(reset.is_loading);
    assert!(reset.results.is_empty());

    let mut rx = slot.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            let done = snapshot.is_complete;
            seen.push(snapshot);
            if done || rx.changed().await.is_err() {
                break;
            }
        }
        seen
    });

    // Late data for the superseded session must never surface
    let _ = first_tx.send(Ok(result_line("a2", 100.0).into())).await;
    second_tx.send(Ok(result_line("b1", 10.0).into())).await.unwrap();
    drop(second_tx);

    let report = slot.wait().await.unwrap();
    assert_eq!(report.session_id, second_id);
    assert_eq!(report.state, SessionState::Completed);

    let seen = tokio::time::timeout(Duration::from_secs(5), observer)
        .await
        .unwrap()
        .unwrap();
    for snapshot in &seen {
        assert!(
            ids(snapshot).iter().all(|id| id.starts_with('b')),
            "superseded data leaked: {:?}",
            ids(snapshot)
        );
    }

    let last = slot.snapshot();
    assert_eq!(ids(&last), ["b1"]);
    assert!(last.is_complete);

    let queries: Vec<String> = transport.requests().into_iter().map(|r| r.query).collect();
    assert_eq!(queries, ["first query", "second query"]);
}

#[tokio::test]
async fn test_request_carries_query_text() {
    let transport =
        Arc::new(MemoryTransport::new().respond(MemorySource::from_chunks::<_, &str>([])));
    let slot = slot(&transport);

    slot.submit("fintech startups in Pune with 50+ employees").unwrap();
    slot.wait().await.unwrap();

    let requests = transport.requests();
    assert_eq!(
        requests,
        [QueryRequest::new("fintech startups in Pune with 50+ employees")]
    );
    assert_eq!(
        serde_json::to_value(&requests[0]).unwrap(),
        serde_json::json!({"query": "fintech startups in Pune with 50+ employees"})
    );
}

#[tokio::test]
async fn test_blank_query_leaves_state_untouched() {
    let transport = Arc::new(MemoryTransport::new().respond(MemorySource::from_chunks([
        result_line("keep", 5.0),
    ])));
    let slot = slot(&transport);

    slot.submit("kept").unwrap();
    slot.wait().await.unwrap();
    let before = slot.snapshot();

    assert_eq!(slot.submit(""), None);
    assert_eq!(slot.submit(" \t\n"), None);
    assert_eq!(slot.snapshot(), before);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_initial_status_is_configurable() {
    let (_tx, source) = MemorySource::channel(1);
    let transport = Arc::new(MemoryTransport::new().respond(source));
    let config = RankStreamConfig::default()
        .with_session(SessionConfig::default().with_initial_status(Some("Searching...".into())));
    let slot = QuerySlot::new(transport, config).unwrap();

    slot.submit("q").unwrap();
    let snapshot = slot.snapshot();
    assert!(snapshot.is_loading);
    assert_eq!(snapshot.status_message.as_deref(), Some("Searching..."));
    assert!(slot.cancel());
}

#[tokio::test]
async fn test_slot_cancel_freezes_snapshot() {
    let (tx, source) = MemorySource::channel(8);
    let transport = Arc::new(MemoryTransport::new().respond(source));
    let slot = slot(&transport);

    slot.submit("q").unwrap();
    tx.send(Ok(result_line("c1", 1.0).into())).await.unwrap();
    let mut rx = slot.subscribe();
    rx.wait_for(|s| s.results.len() == 1).await.unwrap();

    assert!(slot.cancel());
    assert!(!slot.cancel());
    let _ = tx.send(Ok(result_line("c2", 2.0).into())).await;

    let report = slot.wait().await.unwrap();
    assert_eq!(report.state, SessionState::Cancelled);
    let frozen = slot.snapshot();
    assert_eq!(ids(&frozen), ["c1"]);
    assert_eq!(frozen.error, None);
    assert!(frozen.is_loading);
    assert!(!frozen.is_complete);
}

#[tokio::test]
async fn test_failed_session_is_visible_to_subscribers() {
    let transport = Arc::new(MemoryTransport::new().refuse(TransportError::connect("refused")));
    let slot = slot(&transport);

    slot.submit("q").unwrap();
    let report = slot.wait().await.unwrap();
    assert_eq!(report.state, SessionState::Failed);

    let snapshot = slot.snapshot();
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.status_message, None);
    assert_eq!(snapshot.error.map(|e| e.kind), Some(ErrorKind::Transport));
}

#[tokio::test]
async fn test_resubmit_after_completion() {
    let transport = Arc::new(
        MemoryTransport::new()
            .respond(MemorySource::from_chunks([result_line("x", 1.0)]))
            .respond(MemorySource::from_chunks([result_line("y", 2.0)])),
    );
    let slot = slot(&transport);

    slot.submit("one").unwrap();
    slot.wait().await.unwrap();
    assert_eq!(ids(&slot.snapshot()), ["x"]);

    slot.submit("two").unwrap();
    slot.wait().await.unwrap();
    assert_eq!(ids(&slot.snapshot()), ["y"]);
}

#[tokio::test]
async fn test_dropping_slot_cancels_session() {
    let (tx, source) = MemorySource::channel(1);
    let transport = Arc::new(MemoryTransport::new().respond(source));
    let slot = slot(&transport);

    slot.submit("q").unwrap();
    tx.send(Ok(result_line("c1", 1.0).into())).await.unwrap();
    slot.subscribe()
        .wait_for(|s| s.results.len() == 1)
        .await
        .unwrap();
    drop(slot);

    tokio::time::timeout(Duration::from_secs(5), tx.closed())
        .await
        .expect("session still reading after slot was dropped");
}

#[tokio::test]
async fn test_dropping_slot_before_session_starts() {
    let (_tx, source) = MemorySource::channel(1);
    let transport = Arc::new(MemoryTransport::new().respond(source));
    let slot = slot(&transport);
    let mut rx = slot.subscribe();

    slot.submit("q").unwrap();
    drop(slot);
    assert!(rx.borrow_and_update().is_loading);

    // Every sender is gone once the cancelled session task ends
    let closed = tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("session task still running after slot was dropped");
    assert!(closed.is_err());
    assert!(transport.requests().is_empty());
    assert!(rx.borrow().results.is_empty());
}

#[tokio::test]
async fn test_adapt_snapshot_payloads() {
    let body = format!(
        "{}{}",
        company_line("C1", "Acme Robotics", 80.0),
        company_line("C2", "Globex", 95.0)
    );
    let transport = Arc::new(MemoryTransport::new().respond(MemorySource::from_chunks([body])));
    let slot = slot(&transport);

    slot.submit("robotics").unwrap();
    slot.wait().await.unwrap();

    let snapshot: AggregateState = slot.snapshot();
    let cards = snapshot.adapt(&|item: &RankedItem| {
        let name = item.payload()["company"]["name"].as_str()?;
        Some(format!("{name} ({})", item.score()))
    });
    assert_eq!(cards, ["Globex (95)", "Acme Robotics (80)"]);
}
