//! Types and the handler trait for requests the *server* initiates
//! against the client: `roots/list` and `sampling/createMessage`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mcp_protocol::{ContentBlock, Role};

/// One entry in the client's list of accessible filesystem roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRootsResult {
    pub roots: Vec<Root>,
}

/// A single message in a sampling request's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingMessage {
    pub role: Role,
    pub content: ContentBlock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageParams {
    pub messages: Vec<SamplingMessage>,
    #[serde(rename = "systemPrompt", default)]
    pub system_prompt: Option<String>,
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageResult {
    pub role: Role,
    pub content: ContentBlock,
    pub model: String,
    #[serde(rename = "stopReason", skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// Implemented by whatever on the client side can answer the server's
/// bidirectional requests. A client that doesn't support one of these
/// simply doesn't advertise the corresponding capability at
/// `initialize` time; the trait still requires both methods so the
/// dispatcher always has somewhere to route to.
#[async_trait]
pub trait ServerRequestHandler: Send + Sync {
    async fn list_roots(&self) -> mcp_protocol::Result<ListRootsResult>;

    async fn create_message(
        &self,
        params: CreateMessageParams,
    ) -> mcp_protocol::Result<CreateMessageResult>;
}
