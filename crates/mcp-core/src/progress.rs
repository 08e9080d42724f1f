//! Progress notification side-channel: tracks which progress tokens are
//! currently in flight and emits `notifications/progress` for them.

use dashmap::DashSet;

use mcp_protocol::{JsonRpcNotification, ProgressToken};

use crate::context::RequestContext;

/// Tracks outstanding progress tokens. A token is registered when a
/// request declares `_meta.progressToken` and removed once the request
/// completes; [`ProgressManager::notify`] only emits for a token that's
/// still active, so a handler that keeps reporting progress after its
/// owning request has been cancelled is silently ignored rather than
/// surfacing a notification for a request the client has given up on.
#[derive(Default)]
pub struct ProgressManager {
    active: DashSet<ProgressToken>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, token: ProgressToken) {
        self.active.insert(token);
    }

    pub fn end(&self, token: &ProgressToken) {
        self.active.remove(token);
    }

    pub fn is_active(&self, token: &ProgressToken) -> bool {
        self.active.contains(token)
    }

    /// Build a `notifications/progress` notification for `token` and
    /// send it through `cx`'s attached sink, if `token` is still active.
    /// Returns whether it was actually sent.
    pub fn notify(
        &self,
        cx: &RequestContext,
        token: &ProgressToken,
        progress: f64,
        total: Option<f64>,
        message: Option<String>,
    ) -> bool {
        if !self.is_active(token) {
            return false;
        }

        let mut params = serde_json::json!({
            "progressToken": token,
            "progress": progress,
        });
        if let Some(total) = total {
            params["total"] = serde_json::json!(total);
        }
        if let Some(message) = message {
            params["message"] = serde_json::json!(message);
        }

        let Ok(notification) = JsonRpcNotification::with_params("notifications/progress", params)
        else {
            return false;
        };
        cx.notify(notification);
        true
    }
}
