//! A cloneable handle for poking the orchestrator from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for aborting and observing the current turn.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct TurnHandle {
    cancel: Arc<Mutex<CancellationToken>>,
    idle_notify: Arc<tokio::sync::Notify>,
    is_running: Arc<AtomicBool>,
}

impl TurnHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the handle for a new turn. Returns a fresh cancellation token,
    /// or `None` if a turn is already running.
    pub(crate) fn begin(&self) -> Option<CancellationToken> {
        if self.is_running.swap(true, Ordering::AcqRel) {
            return None;
        }
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        Some(token)
    }

    pub(crate) fn finish(&self) {
        self.is_running.store(false, Ordering::Release);
        self.idle_notify.notify_waiters();
    }

    /// Abort the current turn. Does nothing when idle.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Wait until the current turn finishes.
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_running.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }

    /// Whether a turn is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }
}
