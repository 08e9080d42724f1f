//! Per-request context threaded through every handler invocation.

use std::collections::BTreeMap;
use std::sync::Arc;

use mcp_protocol::{JsonRpcNotification, ProgressToken, RequestId};

use crate::progress::ProgressManager;

/// Destination for a server-initiated notification (`notifications/progress`,
/// `notifications/message`) reached through whatever transport the request
/// that created this context arrived on. A [`RequestContext`] built without
/// one (e.g. in tests, or for a transport with no push channel) silently
/// drops anything sent to it — handlers never need to check whether a sink
/// is attached before reporting progress.
pub trait NotificationSink: Send + Sync {
    fn send(&self, notification: JsonRpcNotification);
}

/// Which transport received the request currently being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportType {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// The streamable HTTP transport (POST + SSE)
    StreamableHttp,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::StreamableHttp => "streamable_http",
        }
    }
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State carried alongside a single inbound request: which transport it
/// arrived on, which session (if any) it belongs to, free-form metadata
/// handlers can stash things in (request headers, auth principal, etc.)
/// without every call site needing a new context field, and the outbound
/// machinery (notification sink, progress tokens) a handler needs to
/// push something back to the client mid-request.
#[derive(Clone, Default)]
pub struct RequestContext {
    /// The request's JSON-RPC id, absent for notifications
    pub request_id: Option<RequestId>,
    /// Transport that received this request
    pub transport: TransportType,
    /// Streamable-HTTP session id, when applicable
    pub session_id: Option<String>,
    /// Arbitrary metadata (headers, auth principal, etc.)
    pub metadata: BTreeMap<String, String>,
    /// Where server-initiated notifications for this request go, if
    /// anywhere.
    pub notifier: Option<Arc<dyn NotificationSink>>,
    /// The server's progress-token tracker, so a handler can call
    /// [`RequestContext::notify_progress`] without holding a reference
    /// to the server itself.
    pub progress: Option<Arc<ProgressManager>>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("transport", &self.transport)
            .field("session_id", &self.session_id)
            .field("metadata", &self.metadata)
            .field("notifier", &self.notifier.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl RequestContext {
    pub fn new(transport: TransportType) -> Self {
        Self {
            request_id: None,
            transport,
            session_id: None,
            metadata: BTreeMap::new(),
            notifier: None,
            progress: None,
        }
    }

    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_progress_manager(mut self, progress: Arc<ProgressManager>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Send a notification through this request's sink, if one is
    /// attached. A no-op otherwise.
    pub fn notify(&self, notification: JsonRpcNotification) {
        if let Some(sink) = &self.notifier {
            sink.send(notification);
        }
    }

    /// Build and send a `notifications/progress` notification for
    /// `token`, if the server's progress manager still considers it
    /// active. Returns whether it was actually sent — `false` if no
    /// progress manager is attached, or the token is unknown or has
    /// already ended.
    pub fn notify_progress(
        &self,
        token: ProgressToken,
        progress: f64,
        total: Option<f64>,
        message: Option<String>,
    ) -> bool {
        match &self.progress {
            Some(manager) => manager.notify(self, &token, progress, total, message),
            None => false,
        }
    }
}
