//! The outward-facing client handle: builds requests, allocates ids,
//! and awaits their correlated responses through the dispatcher.

use std::sync::Arc;

use mcp_protocol::{Error as ProtocolError, JsonRpcNotification, JsonRpcRequest};

use crate::dispatcher::MessageDispatcher;
use crate::server_request::ServerRequestHandler;
use crate::transport::ClientTransport;

/// A connected MCP client. Cheap to clone — it's a thin handle around
/// the dispatcher, which owns the actual routing state.
#[derive(Clone)]
pub struct Client {
    dispatcher: Arc<MessageDispatcher>,
}

impl Client {
    pub fn new(transport: Arc<dyn ClientTransport>) -> Self {
        Self {
            dispatcher: MessageDispatcher::spawn(transport),
        }
    }

    /// Register the handler that answers `roots/list` and
    /// `sampling/createMessage` when the server initiates them.
    pub fn set_server_request_handler(&self, handler: Arc<dyn ServerRequestHandler>) {
        self.dispatcher.set_server_request_handler(handler);
    }

    /// Issue a request and await its response, decoding `result` into `R`.
    pub async fn request<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> mcp_protocol::Result<R> {
        let id = self.dispatcher.next_request_id();
        let request = JsonRpcRequest::new(method, params, id.clone());

        let waiter = self.dispatcher.request(request).await?;
        let response = waiter.await.map_err(|_| {
            ProtocolError::Transport("dispatcher dropped before a response arrived".to_string())
        })?;

        match response.payload {
            mcp_protocol::JsonRpcResponsePayload::Success { result } => {
                serde_json::from_value(result).map_err(|e| ProtocolError::Internal(e.to_string()))
            }
            mcp_protocol::JsonRpcResponsePayload::Error { error } => {
                Err(ProtocolError::Internal(error.message))
            }
        }
    }

    /// Send a one-way notification; no response is expected.
    pub async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> mcp_protocol::Result<()> {
        self.dispatcher
            .notify(JsonRpcNotification::new(method, params))
            .await
    }

    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }
}
