//! Session identity and the process-wide session store.
//!
//! A session is created on the first `initialize` POST and threaded
//! through every subsequent POST/GET on the same `Mcp-Session-Id`. It
//! owns the SSE push channel a bound GET stream writes from.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use rand::RngCore;
use tokio::sync::mpsc;

use crate::sse::SseEvent;

/// A 128-bit session identifier, rendered as 32 lowercase hex digits
/// with no prefix — the literal wire format the `Mcp-Session-Id` header
/// carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = InvalidSessionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidSessionId)
        }
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("session id must be 32 lowercase hex characters")]
pub struct InvalidSessionId;

/// One MCP session: its SSE push channel, when a GET stream is bound to
/// it, and a monotonically increasing event id for that stream.
pub struct Session {
    pub id: SessionId,
    sse_tx: parking_lot::RwLock<Option<mpsc::UnboundedSender<SseEvent>>>,
    next_event_id: AtomicU64,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            sse_tx: parking_lot::RwLock::new(None),
            next_event_id: AtomicU64::new(1),
        }
    }

    /// Bind a GET stream's sender to this session, replacing any
    /// previous one — last writer wins on simultaneous GET binds.
    pub fn bind_sse(&self, tx: mpsc::UnboundedSender<SseEvent>) {
        *self.sse_tx.write() = Some(tx);
    }

    pub fn unbind_sse(&self) {
        *self.sse_tx.write() = None;
    }

    pub fn has_sse_binding(&self) -> bool {
        self.sse_tx.read().is_some()
    }

    /// Push a server-initiated message to the bound SSE stream, if any.
    /// Returns `false` if no GET stream is currently bound.
    pub fn push(&self, data: String) -> bool {
        let id = self.next_event_id.fetch_add(1, Ordering::Relaxed);
        let event = SseEvent {
            id: Some(id),
            event: None,
            data,
        };
        match self.sse_tx.read().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

/// Lets a [`Session`] stand in directly as a [`mcp_core::NotificationSink`]:
/// a request context built with this session's notifier attached delivers
/// `notifications/progress` and `notifications/message` over the bound SSE
/// stream. A session with no GET stream currently bound just drops them,
/// the same as [`Session::push`] returning `false`.
impl mcp_core::NotificationSink for Session {
    fn send(&self, notification: mcp_protocol::JsonRpcNotification) {
        match serde_json::to_string(&notification) {
            Ok(data) => {
                self.push(data);
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode outbound notification");
            }
        }
    }
}

/// Process-wide registry of live sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> Arc<Session> {
        let id = SessionId::generate();
        let session = Arc::new(Session::new(id.clone()));
        self.sessions.insert(id, session.clone());
        session
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|e| e.clone())
    }

    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_32_lowercase_hex_chars() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn from_str_rejects_wrong_length_or_case() {
        assert!("abc".parse::<SessionId>().is_err());
        assert!("A".repeat(32).parse::<SessionId>().is_err());
        assert!("a".repeat(32).parse::<SessionId>().is_ok());
    }

    #[test]
    fn store_create_then_get_round_trips() {
        let store = SessionStore::new();
        let session = store.create();
        assert!(store.get(&session.id).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn push_without_bound_stream_returns_false() {
        let store = SessionStore::new();
        let session = store.create();
        assert!(!session.push("hello".into()));
    }

    #[tokio::test]
    async fn push_with_bound_stream_delivers_event() {
        let store = SessionStore::new();
        let session = store.create();
        let (tx, mut rx) = mpsc::unbounded_channel();
        session.bind_sse(tx);

        assert!(session.push("hello".into()));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.data, "hello");
        assert_eq!(event.id, Some(1));
    }

    #[tokio::test]
    async fn notification_sink_pushes_encoded_notification_over_sse() {
        use mcp_core::NotificationSink;

        let store = SessionStore::new();
        let session = store.create();
        let (tx, mut rx) = mpsc::unbounded_channel();
        session.bind_sse(tx);

        let notification = mcp_protocol::JsonRpcNotification::with_params(
            "notifications/progress",
            serde_json::json!({"progressToken": "job-1", "progress": 50.0}),
        )
        .unwrap();
        session.send(notification);

        let event = rx.recv().await.unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(decoded["method"], "notifications/progress");
        assert_eq!(decoded["params"]["progressToken"], "job-1");
    }

    #[test]
    fn notification_sink_without_bound_stream_is_a_no_op() {
        use mcp_core::NotificationSink;

        let store = SessionStore::new();
        let session = store.create();
        let notification =
            mcp_protocol::JsonRpcNotification::with_params("notifications/progress", serde_json::json!({}))
                .unwrap();
        session.send(notification);
    }

    #[tokio::test]
    async fn rebinding_is_last_writer_wins() {
        let store = SessionStore::new();
        let session = store.create();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        session.bind_sse(tx1);
        session.bind_sse(tx2);

        session.push("hi".into());
        assert!(rx2.try_recv().is_ok());
        assert!(rx1.try_recv().is_err());
    }
}
