//! The abstract surface a client needs from its transport. Concrete
//! transports (`mcp-transport-streamable`'s reqwest-based client, a
//! stdio pipe) implement this so the dispatcher never has to know which
//! one it's talking to.

use async_trait::async_trait;

use mcp_protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Anything the client can receive that isn't a response to one of its
/// own requests: a server-initiated request (`roots/list`,
/// `sampling/createMessage`) or a one-way notification.
#[derive(Debug, Clone)]
pub enum Inbound {
    Response(JsonRpcResponse),
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

/// A duplex message channel to an MCP server.
#[async_trait]
pub trait ClientTransport: Send + Sync {
    /// Send a request, expecting a future `Inbound::Response` with a
    /// matching id.
    async fn send_request(&self, request: JsonRpcRequest) -> mcp_protocol::Result<()>;

    /// Send a one-way notification.
    async fn send_notification(&self, notification: JsonRpcNotification) -> mcp_protocol::Result<()>;

    /// Send a response to a server-initiated request.
    async fn send_response(&self, response: JsonRpcResponse) -> mcp_protocol::Result<()>;

    /// Block until the next inbound message arrives, or `None` once the
    /// transport has closed.
    async fn receive(&self) -> mcp_protocol::Result<Option<Inbound>>;
}
