//! Cooperative cancellation shared between a session and its owner

use parking_lot::ReentrantMutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    token: tokio_util::sync::CancellationToken,
    /// Serializes cancellation against in-progress mutations
    gate: ReentrantMutex<()>,
}

/// Cancellation token with a mutation gate.
///
/// [`run_if_active`](Self::run_if_active) and [`cancel`](Self::cancel) take
/// the same lock, so once `cancel` returns no guarded closure can start and
/// none is still running. The lock is reentrant: a snapshot callback may
/// cancel its own session.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Create an active token
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake pending waiters.
    ///
    /// Returns `false` when the token was already cancelled.
    pub fn cancel(&self) -> bool {
        let _gate = self.inner.gate.lock();
        if self.inner.token.is_cancelled() {
            return false;
        }
        self.inner.token.cancel();
        true
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolve once the token is cancelled
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    /// Run `f` unless cancelled, holding the gate for its whole duration
    pub fn run_if_active<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let _gate = self.inner.gate.lock();
        if self.is_cancelled() {
            return None;
        }
        Some(f())
    }
}
