//! The proxy itself: at construction, lists a remote server's tools,
//! resources, resource templates, and prompts, then registers a
//! forwarding handler for each in a fresh local [`Server`]. From then
//! on the proxy behaves exactly like any other server to its own
//! callers — it just happens to delegate every call across the wire.

use std::sync::Arc;

use mcp_client::Client;
use mcp_protocol::{
    Implementation, ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult,
};
use mcp_server::Server;

use crate::error::ProxyError;
use crate::forward::{ForwardingPromptHandler, ForwardingResourceHandler, ForwardingToolHandler};

/// A server whose registries mirror a remote server's, forwarding every
/// call back through the client that discovered them.
pub struct ProxyServer {
    server: Arc<Server>,
    client: Arc<Client>,
}

impl ProxyServer {
    /// Connect to `client`'s remote and build a local server reflecting
    /// everything it currently exposes. A registration failure (e.g. a
    /// duplicate tool name surfacing from the remote's own list) aborts
    /// construction rather than leaving a partially-mirrored proxy.
    pub async fn connect(client: Arc<Client>, implementation: Implementation) -> Result<Self, ProxyError> {
        let server = Arc::new(Server::new(implementation));

        sync_tools(&server, &client).await?;
        sync_resources(&server, &client).await?;
        sync_resource_templates(&server, &client).await?;
        sync_prompts(&server, &client).await?;

        Ok(Self { server, client })
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }
}

async fn sync_tools(server: &Server, client: &Arc<Client>) -> Result<(), ProxyError> {
    let result: ListToolsResult = client.request("tools/list", None).await?;
    for tool in result.tools {
        let handler = Arc::new(ForwardingToolHandler::new(client.clone(), tool.name.clone()));
        server.register_tool(tool, handler)?;
    }
    Ok(())
}

async fn sync_resources(server: &Server, client: &Arc<Client>) -> Result<(), ProxyError> {
    let result: ListResourcesResult = client.request("resources/list", None).await?;
    for resource in result.resources {
        let handler = Arc::new(ForwardingResourceHandler::new(client.clone()));
        server.register_resource(resource, handler);
    }
    Ok(())
}

async fn sync_resource_templates(server: &Server, client: &Arc<Client>) -> Result<(), ProxyError> {
    let result: ListResourceTemplatesResult = client.request("resources/templates/list", None).await?;
    for template in result.resource_templates {
        let handler = Arc::new(ForwardingResourceHandler::new(client.clone()));
        server.register_resource_template(template, handler)?;
    }
    Ok(())
}

async fn sync_prompts(server: &Server, client: &Arc<Client>) -> Result<(), ProxyError> {
    let result: ListPromptsResult = client.request("prompts/list", None).await?;
    for prompt in result.prompts {
        let handler = Arc::new(ForwardingPromptHandler::new(client.clone(), prompt.name.clone()));
        server.register_prompt(prompt, handler);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mcp_client::{ClientTransport, Inbound};
    use mcp_protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
    use std::sync::atomic::{AtomicI64, Ordering};
    use tokio::sync::mpsc;

    /// A transport that answers canned `*/list` responses and routes
    /// everything else (the forwarded calls under test) to whatever the
    /// test installs via `on_call`.
    struct ScriptedTransport {
        inbound_tx: mpsc::UnboundedSender<Inbound>,
        inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>,
        next_id: AtomicI64,
    }

    impl ScriptedTransport {
        fn new() -> Arc<Self> {
            let (tx, rx) = mpsc::unbounded_channel();
            Arc::new(Self {
                inbound_tx: tx,
                inbound_rx: tokio::sync::Mutex::new(rx),
                next_id: AtomicI64::new(1),
            })
        }
    }

    #[async_trait]
    impl ClientTransport for ScriptedTransport {
        async fn send_request(&self, request: JsonRpcRequest) -> mcp_protocol::Result<()> {
            self.next_id.fetch_add(1, Ordering::Relaxed);
            let result = match request.method.as_str() {
                "tools/list" => serde_json::json!({
                    "tools": [{
                        "name": "echo",
                        "inputSchema": {"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]}
                    }]
                }),
                "resources/list" => serde_json::json!({"resources": []}),
                "resources/templates/list" => serde_json::json!({"resourceTemplates": []}),
                "prompts/list" => serde_json::json!({"prompts": []}),
                "tools/call" => serde_json::json!({"content": [{"type": "text", "text": "forwarded"}]}),
                other => panic!("unexpected method in test: {other}"),
            };
            let _ = self
                .inbound_tx
                .send(Inbound::Response(JsonRpcResponse::success(result, request.id)));
            Ok(())
        }
        async fn send_notification(&self, _n: JsonRpcNotification) -> mcp_protocol::Result<()> {
            Ok(())
        }
        async fn send_response(&self, _r: JsonRpcResponse) -> mcp_protocol::Result<()> {
            Ok(())
        }
        async fn receive(&self) -> mcp_protocol::Result<Option<Inbound>> {
            Ok(self.inbound_rx.lock().await.recv().await)
        }
    }

    fn implementation() -> Implementation {
        Implementation { name: "proxy-under-test".into(), version: "0.1.0".into() }
    }

    #[tokio::test]
    async fn connect_mirrors_remote_tool_list() {
        let client = Arc::new(Client::new(ScriptedTransport::new()));
        let proxy = ProxyServer::connect(client, implementation()).await.unwrap();
        assert!(proxy.server().tools().contains("echo"));
    }

    #[tokio::test]
    async fn call_through_proxy_forwards_to_remote() {
        let client = Arc::new(Client::new(ScriptedTransport::new()));
        let proxy = ProxyServer::connect(client, implementation()).await.unwrap();

        let cx = mcp_core::RequestContext::default();
        let result = proxy
            .server()
            .tools()
            .call("echo", serde_json::json!({"text": "hi"}), &cx)
            .await
            .unwrap();

        match &result.content[0] {
            mcp_protocol::ContentBlock::Text(t) => assert_eq!(t.text, "forwarded"),
            _ => panic!("expected text content"),
        }
    }

}
