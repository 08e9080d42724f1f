//! Handlers that forward every call straight back through the client
//! they were reflected from, so the proxy's own registries need no
//! logic of their own beyond routing by remote name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use mcp_client::Client;
use mcp_core::{PromptHandler, RequestContext, ResourceHandler, ToolHandler};
use mcp_protocol::{CallToolResult, GetPromptResult, ReadResourceResult};

pub struct ForwardingToolHandler {
    client: Arc<Client>,
    remote_name: String,
}

impl ForwardingToolHandler {
    pub fn new(client: Arc<Client>, remote_name: String) -> Self {
        Self { client, remote_name }
    }
}

#[async_trait]
impl ToolHandler for ForwardingToolHandler {
    async fn call(&self, arguments: Value, _cx: &RequestContext) -> mcp_protocol::Result<CallToolResult> {
        self.client
            .request(
                "tools/call",
                Some(serde_json::json!({"name": self.remote_name, "arguments": arguments})),
            )
            .await
    }
}

pub struct ForwardingResourceHandler {
    client: Arc<Client>,
}

impl ForwardingResourceHandler {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceHandler for ForwardingResourceHandler {
    async fn read(
        &self,
        uri: &str,
        _params: &HashMap<String, String>,
        _cx: &RequestContext,
    ) -> mcp_protocol::Result<ReadResourceResult> {
        self.client
            .request("resources/read", Some(serde_json::json!({"uri": uri})))
            .await
    }
}

pub struct ForwardingPromptHandler {
    client: Arc<Client>,
    remote_name: String,
}

impl ForwardingPromptHandler {
    pub fn new(client: Arc<Client>, remote_name: String) -> Self {
        Self { client, remote_name }
    }
}

#[async_trait]
impl PromptHandler for ForwardingPromptHandler {
    async fn render(
        &self,
        arguments: &HashMap<String, String>,
        _cx: &RequestContext,
    ) -> mcp_protocol::Result<GetPromptResult> {
        self.client
            .request(
                "prompts/get",
                Some(serde_json::json!({"name": self.remote_name, "arguments": arguments})),
            )
            .await
    }
}
