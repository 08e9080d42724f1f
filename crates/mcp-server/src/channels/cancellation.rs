//! Cancellation side-channel: maps an in-flight request id to a callback
//! that aborts it, driven by inbound `notifications/cancelled`.

use std::sync::Arc;

use dashmap::DashMap;

use mcp_protocol::RequestId;

/// A cancellation callback registered for the lifetime of one request.
pub type CancelFn = Arc<dyn Fn() + Send + Sync>;

/// Tracks which in-flight requests can be cancelled and how.
#[derive(Default)]
pub struct CancellationManager {
    cancel_fns: DashMap<RequestId, CancelFn>,
}

impl CancellationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cancel callback for `id`. Call this when dispatch
    /// begins handling a cancellable request; call [`Self::clear`] once
    /// it completes, win or lose.
    pub fn register(&self, id: RequestId, cancel: CancelFn) {
        self.cancel_fns.insert(id, cancel);
    }

    pub fn clear(&self, id: &RequestId) {
        self.cancel_fns.remove(id);
    }

    /// Invoke and remove the cancel callback for `id`, if one is
    /// registered. A cancellation notification for an unknown or
    /// already-completed id is a no-op — the request may have finished
    /// before the notification arrived.
    pub fn cancel(&self, id: &RequestId) {
        if let Some((_, cancel)) = self.cancel_fns.remove(id) {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn cancel_invokes_registered_callback_once() {
        let manager = CancellationManager::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        manager.register(
            RequestId::Number(1),
            Arc::new(move || flag.store(true, Ordering::SeqCst)),
        );

        manager.cancel(&RequestId::Number(1));
        assert!(fired.load(Ordering::SeqCst));

        // Cancelling again (already removed) is a no-op, not a panic.
        manager.cancel(&RequestId::Number(1));
    }

    #[test]
    fn cancel_of_unknown_id_is_a_no_op() {
        let manager = CancellationManager::new();
        manager.cancel(&RequestId::Number(404));
    }
}
