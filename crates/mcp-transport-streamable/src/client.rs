//! The client side of the streamable HTTP transport: POSTs JSON-RPC
//! requests/notifications/responses, and maintains a background GET-SSE
//! reader that feeds server-initiated requests and notifications back
//! through the same [`mcp_client::ClientTransport`] surface the
//! dispatcher consumes. Reconnects on stream drop using the last seen
//! event id; no message replay is requested — this transport makes no
//! delivery guarantee across a reconnect, matching the eventually
//! consistent nature of the rest of the protocol.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::RwLock;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as HttpClient;
use tokio::sync::{mpsc, Notify};

use mcp_client::{ClientTransport, Inbound};
use mcp_protocol::{Error as ProtocolError, JsonRpcInboundItem, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

use crate::sse::SseDecoder;

const SESSION_HEADER: &str = "mcp-session-id";
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// A `ClientTransport` backed by a single `/mcp` endpoint: POSTs go out
/// over plain HTTP requests, and a background task holds a GET-SSE
/// connection open for pushes the server initiates outside of any POST
/// response.
pub struct StreamableHttpClientTransport {
    http: HttpClient,
    url: String,
    session_id: RwLock<Option<String>>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>,
    shutdown: Notify,
    last_event_id: Arc<AtomicU64>,
}

impl StreamableHttpClientTransport {
    pub fn connect(url: impl Into<String>) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            http: HttpClient::new(),
            url: url.into(),
            session_id: RwLock::new(None),
            inbound_tx: tx,
            inbound_rx: tokio::sync::Mutex::new(rx),
            shutdown: Notify::new(),
            last_event_id: Arc::new(AtomicU64::new(0)),
        });
        Self::spawn_sse_reader(transport.clone());
        transport
    }

    fn session_header(&self) -> Option<HeaderValue> {
        self.session_id
            .read()
            .as_ref()
            .and_then(|id| HeaderValue::from_str(id).ok())
    }

    async fn post(&self, body: serde_json::Value) -> mcp_protocol::Result<reqwest::Response> {
        let mut request = self
            .http
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json, text/event-stream")
            .json(&body);

        if let Some(session) = self.session_header() {
            request = request.header(SESSION_HEADER, session);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;

        if let Some(session) = response.headers().get(SESSION_HEADER) {
            if let Ok(session) = session.to_str() {
                *self.session_id.write() = Some(session.to_string());
            }
        }

        Ok(response)
    }

    fn spawn_sse_reader(transport: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = transport.shutdown.notified() => {
                        tracing::debug!("streamable http client shutting down");
                        break;
                    }
                    _ = transport.run_sse_session() => {
                        tracing::debug!("sse stream ended, reconnecting");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });
    }

    async fn run_sse_session(&self) {
        let Some(session) = self.session_header() else {
            // No session established yet (initialize hasn't completed);
            // wait and retry rather than busy-looping.
            tokio::time::sleep(RECONNECT_DELAY).await;
            return;
        };

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(SESSION_HEADER, session);
        let last_id = self.last_event_id.load(Ordering::Relaxed);
        if last_id > 0 {
            if let Ok(value) = HeaderValue::from_str(&last_id.to_string()) {
                headers.insert("last-event-id", value);
            }
        }

        let response = match self.http.get(&self.url).headers(headers).send().await {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "sse connect failed");
                return;
            }
        };

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        while let Some(chunk) = stream.next().await {
            let Ok(chunk) = chunk else { break };
            let text = String::from_utf8_lossy(&chunk);
            for event in decoder.feed(&text) {
                if let Some(id) = event.id {
                    self.last_event_id.store(id, Ordering::Relaxed);
                }
                self.dispatch_pushed_event(&event.data);
            }
        }
    }

    fn dispatch_pushed_event(&self, data: &str) {
        let Ok(item) = serde_json::from_str::<JsonRpcInboundItem>(data) else {
            tracing::warn!("dropping malformed sse payload");
            return;
        };
        let inbound = match item {
            JsonRpcInboundItem::Request(r) => Inbound::Request(r),
            JsonRpcInboundItem::Notification(n) => Inbound::Notification(n),
        };
        let _ = self.inbound_tx.send(inbound);
    }
}

#[async_trait]
impl ClientTransport for StreamableHttpClientTransport {
    async fn send_request(&self, request: JsonRpcRequest) -> mcp_protocol::Result<()> {
        let value = serde_json::to_value(&request).expect("JsonRpcRequest always serializes");
        let response = self.post(value).await?;
        if response.status() == reqwest::StatusCode::ACCEPTED {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;
        match serde_json::from_str::<JsonRpcResponse>(&body) {
            Ok(resp) => {
                let _ = self.inbound_tx.send(Inbound::Response(resp));
                Ok(())
            }
            Err(_) => match serde_json::from_str::<Vec<JsonRpcResponse>>(&body) {
                Ok(responses) => {
                    for resp in responses {
                        let _ = self.inbound_tx.send(Inbound::Response(resp));
                    }
                    Ok(())
                }
                Err(e) => Err(ProtocolError::Transport(e.to_string())),
            },
        }
    }

    async fn send_notification(&self, notification: JsonRpcNotification) -> mcp_protocol::Result<()> {
        let value = serde_json::to_value(&notification).expect("JsonRpcNotification always serializes");
        self.post(value).await?;
        Ok(())
    }

    async fn send_response(&self, response: JsonRpcResponse) -> mcp_protocol::Result<()> {
        let value = serde_json::to_value(&response).expect("JsonRpcResponse always serializes");
        self.post(value).await?;
        Ok(())
    }

    async fn receive(&self) -> mcp_protocol::Result<Option<Inbound>> {
        Ok(self.inbound_rx.lock().await.recv().await)
    }
}

impl Drop for StreamableHttpClientTransport {
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}
