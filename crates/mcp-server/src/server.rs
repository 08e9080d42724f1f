//! The dispatcher: decodes a JSON-RPC request's method and params,
//! routes it to the right registry, and encodes the result back into a
//! response. This is the one place that knows the full MCP method table.

use std::sync::Arc;

use mcp_core::{PromptHandler, RequestContext, ResourceHandler, ToolHandler};
use mcp_core::{PromptRegistry, ResourceRegistry, ToolRegistry};
use mcp_protocol::{
    ClientCapabilities, Error as ProtocolError, Implementation, JsonRpcError, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, ListPromptsResult, ListResourceTemplatesResult,
    ListResourcesResult, ListToolsResult, PromptDescriptor, ResourceDescriptor,
    ResourceTemplateDescriptor, ServerCapabilities, ToolDescriptor, PROTOCOL_VERSION,
};
use parking_lot::RwLock;

use crate::channels::{CancellationManager, CompletionRegistry, LoggingManager, ProgressManager};
use crate::middleware::{dispatch_with_recovery, run_after, run_before, Middleware};
use crate::params::*;

/// A standalone MCP server: the three capability registries, side
/// channels, capability negotiation state, and a middleware chain
/// wrapped around dispatch.
pub struct Server {
    pub(crate) implementation: Implementation,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) resources: Arc<ResourceRegistry>,
    pub(crate) prompts: Arc<PromptRegistry>,
    pub(crate) progress: Arc<ProgressManager>,
    pub(crate) logging: Arc<LoggingManager>,
    pub(crate) cancellation: Arc<CancellationManager>,
    pub(crate) completions: Arc<CompletionRegistry>,
    middleware: Vec<Arc<dyn Middleware>>,
    negotiated: RwLock<Option<ClientCapabilities>>,
}

impl Server {
    pub fn new(implementation: Implementation) -> Self {
        Self {
            implementation,
            tools: Arc::new(ToolRegistry::new()),
            resources: Arc::new(ResourceRegistry::new()),
            prompts: Arc::new(PromptRegistry::new()),
            progress: Arc::new(ProgressManager::new()),
            logging: Arc::new(LoggingManager::new()),
            cancellation: Arc::new(CancellationManager::new()),
            completions: Arc::new(CompletionRegistry::new()),
            middleware: Vec::new(),
            negotiated: RwLock::new(None),
        }
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn resources(&self) -> &Arc<ResourceRegistry> {
        &self.resources
    }

    pub fn prompts(&self) -> &Arc<PromptRegistry> {
        &self.prompts
    }

    pub fn register_tool(
        &self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), mcp_core::RegistryError> {
        self.tools.register(descriptor, handler)
    }

    pub fn register_resource(&self, descriptor: ResourceDescriptor, handler: Arc<dyn ResourceHandler>) {
        self.resources.register_static(descriptor, handler);
    }

    pub fn register_resource_template(
        &self,
        descriptor: ResourceTemplateDescriptor,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), mcp_core::RegistryError> {
        self.resources.register_template(descriptor, handler)
    }

    pub fn register_prompt(&self, descriptor: PromptDescriptor, handler: Arc<dyn PromptHandler>) {
        self.prompts.register(descriptor, handler);
    }

    /// Advertise a capability group only when its backing registry holds
    /// something or its side-channel has actually been engaged, rather
    /// than unconditionally claiming everything this server type could
    /// ever support.
    fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            tools: (!self.tools.is_empty()).then(Default::default),
            resources: (!self.resources.is_empty()).then(Default::default),
            prompts: (!self.prompts.is_empty()).then(Default::default),
            logging: self.logging.is_enabled().then(|| serde_json::json!({})),
            completions: (!self.completions.is_empty()).then(|| serde_json::json!({})),
        }
    }

    /// Dispatch a request, running the middleware chain around it. The
    /// dispatch itself always runs under panic recovery, independent of
    /// whatever middleware a caller has installed, so a handler panic
    /// becomes an `Internal` error response rather than taking down the
    /// task driving this call.
    ///
    /// `cx` is enriched with this server's own progress manager before
    /// dispatch, so a handler can call `cx.notify_progress(...)` without
    /// holding a reference to the server. A `_meta.progressToken` on the
    /// request is registered as active for the duration of the call and
    /// retired once it completes, win or lose.
    pub async fn handle_request(&self, request: JsonRpcRequest, cx: RequestContext) -> JsonRpcResponse {
        if let Some(resp) = run_before(&self.middleware, &request, &cx).await {
            return resp;
        }

        let cx = cx.with_progress_manager(self.progress.clone());
        let token = progress_token(&request);
        if let Some(token) = &token {
            self.progress.begin(token.clone());
        }

        let id = request.id.clone();
        let mut response = match dispatch_with_recovery(self.dispatch(request, &cx)).await {
            Ok(result) => JsonRpcResponse::success(result, id),
            Err(err) => JsonRpcResponse::error_response(JsonRpcError::from(err), id),
        };

        if let Some(token) = &token {
            self.progress.end(token);
        }

        run_after(&self.middleware, &mut response, &cx).await;
        response
    }

    /// Handle a one-way notification. There's no response to build, only
    /// side effects (cancellation, the `initialized` handshake ack).
    pub async fn handle_notification(&self, notification: JsonRpcNotification, _cx: RequestContext) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                tracing::debug!("client acknowledged initialization");
            }
            "notifications/cancelled" => {
                if let Some(params) = notification.params {
                    if let Ok(params) = serde_json::from_value::<CancelledParams>(params) {
                        self.cancellation.cancel(&params.request_id);
                    }
                }
            }
            "notifications/roots/list_changed" => {
                tracing::debug!("client roots changed");
            }
            other => {
                tracing::warn!(method = other, "unrecognized notification");
            }
        }
    }

    async fn dispatch(
        &self,
        request: JsonRpcRequest,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<serde_json::Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(request, cx).await,
            "resources/list" => self.handle_list_resources(),
            "resources/read" => self.handle_read_resource(request, cx).await,
            "resources/templates/list" => self.handle_list_resource_templates(),
            "prompts/list" => self.handle_list_prompts(),
            "prompts/get" => self.handle_get_prompt(request, cx).await,
            "completion/complete" => self.handle_complete(request).await,
            "logging/setLevel" => self.handle_set_level(request),
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }

    async fn handle_initialize(&self, request: JsonRpcRequest) -> mcp_protocol::Result<serde_json::Value> {
        let params: InitializeParams = decode_params(request.params)?;
        *self.negotiated.write() = Some(params.capabilities);

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities(),
            server_info: self.implementation.clone(),
            instructions: None,
        };
        Ok(serde_json::to_value(result).expect("InitializeResult always serializes"))
    }

    fn handle_list_tools(&self) -> mcp_protocol::Result<serde_json::Value> {
        let result = ListToolsResult {
            tools: self.tools.list(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result).expect("ListToolsResult always serializes"))
    }

    async fn handle_call_tool(
        &self,
        request: JsonRpcRequest,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<serde_json::Value> {
        let params: CallToolParams = decode_params(request.params)?;
        let result = self.tools.call(&params.name, params.arguments, cx).await?;
        Ok(serde_json::to_value(result).expect("CallToolResult always serializes"))
    }

    fn handle_list_resources(&self) -> mcp_protocol::Result<serde_json::Value> {
        let result = ListResourcesResult {
            resources: self.resources.list_static(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result).expect("ListResourcesResult always serializes"))
    }

    fn handle_list_resource_templates(&self) -> mcp_protocol::Result<serde_json::Value> {
        let result = ListResourceTemplatesResult {
            resource_templates: self.resources.list_templates(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result).expect("ListResourceTemplatesResult always serializes"))
    }

    async fn handle_read_resource(
        &self,
        request: JsonRpcRequest,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<serde_json::Value> {
        let params: ReadResourceParams = decode_params(request.params)?;
        let result = self.resources.read(&params.uri, cx).await?;
        Ok(serde_json::to_value(result).expect("ReadResourceResult always serializes"))
    }

    fn handle_list_prompts(&self) -> mcp_protocol::Result<serde_json::Value> {
        let result = ListPromptsResult {
            prompts: self.prompts.list(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result).expect("ListPromptsResult always serializes"))
    }

    async fn handle_get_prompt(
        &self,
        request: JsonRpcRequest,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<serde_json::Value> {
        let params: GetPromptParams = decode_params(request.params)?;
        let result = self.prompts.get(&params.name, &params.arguments, cx).await?;
        Ok(serde_json::to_value(result).expect("GetPromptResult always serializes"))
    }

    fn handle_set_level(&self, request: JsonRpcRequest) -> mcp_protocol::Result<serde_json::Value> {
        let params: SetLevelParams = decode_params(request.params)?;
        self.logging.set_level(params.level);
        Ok(serde_json::json!({}))
    }

    /// Emit a `notifications/message` through `cx`'s attached sink, if
    /// `level` clears the client's current `logging/setLevel` threshold.
    /// Below-threshold events are silently dropped rather than queued.
    pub fn emit_log(
        &self,
        cx: &RequestContext,
        level: crate::channels::LogLevel,
        logger: Option<String>,
        data: serde_json::Value,
    ) {
        if !self.logging.should_emit(level) {
            return;
        }
        let mut params = serde_json::json!({ "level": level, "data": data });
        if let Some(logger) = logger {
            params["logger"] = serde_json::json!(logger);
        }
        if let Ok(notification) = JsonRpcNotification::with_params("notifications/message", params) {
            cx.notify(notification);
        }
    }

    async fn handle_complete(&self, request: JsonRpcRequest) -> mcp_protocol::Result<serde_json::Value> {
        let params: CompleteParams = decode_params(request.params)?;
        let values = match params.reference {
            CompletionReference::Prompt { name } => {
                self.completions
                    .complete_prompt_argument(&name, &params.argument.name, &params.argument.value)
                    .await
            }
            CompletionReference::Resource { uri } => {
                self.completions
                    .complete_resource_argument(&uri, &params.argument.name, &params.argument.value)
                    .await
            }
        };
        let result = CompleteResult {
            completion: CompletionValues {
                total: Some(values.len()),
                has_more: Some(false),
                values,
            },
        };
        Ok(serde_json::to_value(result).expect("CompleteResult always serializes"))
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(
    params: Option<serde_json::Value>,
) -> mcp_protocol::Result<T> {
    let value = params.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidParams(e.to_string()))
}

/// Pull `_meta.progressToken` out of a request's params, if present.
fn progress_token(request: &JsonRpcRequest) -> Option<mcp_protocol::ProgressToken> {
    request
        .params
        .as_ref()?
        .get("_meta")?
        .get("progressToken")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::{CallToolResult, ContentBlock, RequestId, TextContent};

    struct Add;

    #[async_trait::async_trait]
    impl ToolHandler for Add {
        async fn call(
            &self,
            arguments: serde_json::Value,
            _cx: &RequestContext,
        ) -> mcp_protocol::Result<CallToolResult> {
            let a = arguments["a"].as_i64().unwrap_or(0);
            let b = arguments["b"].as_i64().unwrap_or(0);
            Ok(CallToolResult::ok(vec![ContentBlock::Text(TextContent::new(
                (a + b).to_string(),
            ))]))
        }
    }

    fn add_tool() -> ToolDescriptor {
        ToolDescriptor {
            name: "add".into(),
            title: None,
            description: Some("adds two integers".into()),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
                "required": ["a", "b"]
            }),
            output_schema: None,
            annotations: None,
        }
    }

    fn server() -> Server {
        let server = Server::new(Implementation {
            name: "test-server".into(),
            version: "0.1.0".into(),
        });
        server.register_tool(add_tool(), Arc::new(Add)).unwrap();
        server
    }

    #[tokio::test]
    async fn initialize_returns_capabilities() {
        let server = server();
        let req = JsonRpcRequest::with_params(
            "initialize",
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }),
            RequestId::Number(1),
        )
        .unwrap();
        let resp = server.handle_request(req, RequestContext::default()).await;
        assert!(resp.is_success());
        assert_eq!(
            resp.result().unwrap()["protocolVersion"],
            PROTOCOL_VERSION
        );
    }

    #[test]
    fn capabilities_are_gated_on_registry_contents() {
        let empty = Server::new(Implementation {
            name: "empty".into(),
            version: "0.1.0".into(),
        });
        let caps = empty.capabilities();
        assert!(caps.tools.is_none());
        assert!(caps.resources.is_none());
        assert!(caps.prompts.is_none());
        assert!(caps.logging.is_none());
        assert!(caps.completions.is_none());

        let populated = server();
        let caps = populated.capabilities();
        assert!(caps.tools.is_some());
        assert!(caps.resources.is_none());

        populated.logging.set_level(crate::channels::LogLevel::Debug);
        assert!(populated.capabilities().logging.is_some());
    }

    #[tokio::test]
    async fn call_tool_dispatches_to_handler() {
        let server = server();
        let req = JsonRpcRequest::with_params(
            "tools/call",
            serde_json::json!({"name": "add", "arguments": {"a": 2, "b": 3}}),
            RequestId::Number(2),
        )
        .unwrap();
        let resp = server.handle_request(req, RequestContext::default()).await;
        let result: CallToolResult = serde_json::from_value(resp.result().unwrap().clone()).unwrap();
        match &result.content[0] {
            ContentBlock::Text(t) => assert_eq!(t.text, "5"),
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn call_tool_with_invalid_arguments_returns_error_response() {
        let server = server();
        let req = JsonRpcRequest::with_params(
            "tools/call",
            serde_json::json!({"name": "add", "arguments": {"a": "nope", "b": 3}}),
            RequestId::Number(3),
        )
        .unwrap();
        let resp = server.handle_request(req, RequestContext::default()).await;
        assert!(resp.is_error());
        assert_eq!(resp.error().unwrap().code, -32602);
    }

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let server = server();
        let req = JsonRpcRequest::new("bogus/method", None, RequestId::Number(4));
        let resp = server.handle_request(req, RequestContext::default()).await;
        assert_eq!(resp.error().unwrap().code, -32601);
    }

    #[tokio::test]
    async fn set_level_updates_logging_threshold() {
        let server = server();
        let req = JsonRpcRequest::with_params(
            "logging/setLevel",
            serde_json::json!({"level": "error"}),
            RequestId::Number(5),
        )
        .unwrap();
        let resp = server.handle_request(req, RequestContext::default()).await;
        assert!(resp.is_success());
        assert_eq!(server.logging.level(), crate::channels::LogLevel::Error);
    }

    struct FileTemplate;

    #[async_trait::async_trait]
    impl mcp_core::ResourceHandler for FileTemplate {
        async fn read(
            &self,
            uri: &str,
            params: &std::collections::HashMap<String, String>,
            _cx: &RequestContext,
        ) -> mcp_protocol::Result<mcp_protocol::ReadResourceResult> {
            let path = params.get("path").cloned().unwrap_or_default();
            Ok(mcp_protocol::ReadResourceResult {
                contents: vec![mcp_protocol::ResourceContent::Text(mcp_protocol::TextResourceContents {
                    uri: uri.to_string(),
                    mime_type: Some("text/plain".into()),
                    text: format!("content of {path}"),
                })],
            })
        }
    }

    #[tokio::test]
    async fn read_resource_dispatches_through_matching_template() {
        let server = server();
        server
            .register_resource_template(
                mcp_protocol::ResourceTemplateDescriptor {
                    uri_template: "file:///{path}".into(),
                    name: "file".into(),
                    title: None,
                    description: None,
                    mime_type: None,
                },
                Arc::new(FileTemplate),
            )
            .unwrap();

        let req = JsonRpcRequest::with_params(
            "resources/read",
            serde_json::json!({"uri": "file:///a.txt"}),
            RequestId::Number(6),
        )
        .unwrap();
        let resp = server.handle_request(req, RequestContext::default()).await;
        let result: mcp_protocol::ReadResourceResult =
            serde_json::from_value(resp.result().unwrap().clone()).unwrap();
        match &result.contents[0] {
            mcp_protocol::ResourceContent::Text(t) => {
                assert_eq!(t.mime_type.as_deref(), Some("text/plain"));
                assert_eq!(t.text, "content of a.txt");
            }
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn cancelled_notification_fires_registered_callback() {
        use std::sync::atomic::{AtomicBool, Ordering};
        let server = server();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        server
            .cancellation
            .register(RequestId::Number(9), Arc::new(move || flag.store(true, Ordering::SeqCst)));

        let notification = JsonRpcNotification::with_params(
            "notifications/cancelled",
            serde_json::json!({"requestId": 9}),
        )
        .unwrap();
        server.handle_notification(notification, RequestContext::default()).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    struct Panics;

    #[async_trait::async_trait]
    impl ToolHandler for Panics {
        async fn call(
            &self,
            _arguments: serde_json::Value,
            _cx: &RequestContext,
        ) -> mcp_protocol::Result<CallToolResult> {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn handler_panic_becomes_internal_error_response() {
        let server = server();
        server
            .register_tool(
                ToolDescriptor {
                    name: "explode".into(),
                    title: None,
                    description: None,
                    input_schema: serde_json::json!({"type": "object"}),
                    output_schema: None,
                    annotations: None,
                },
                Arc::new(Panics),
            )
            .unwrap();

        let req = JsonRpcRequest::with_params(
            "tools/call",
            serde_json::json!({"name": "explode", "arguments": {}}),
            RequestId::Number(7),
        )
        .unwrap();
        let resp = server.handle_request(req, RequestContext::default()).await;
        let error = resp.error().unwrap();
        assert_eq!(error.code, -32603);
        assert!(error.message.contains("boom"));
    }

    struct Reporter;

    #[async_trait::async_trait]
    impl ToolHandler for Reporter {
        async fn call(
            &self,
            _arguments: serde_json::Value,
            cx: &RequestContext,
        ) -> mcp_protocol::Result<CallToolResult> {
            cx.notify_progress(mcp_protocol::ProgressToken::String("job-1".into()), 50.0, Some(100.0), None);
            Ok(CallToolResult::ok(vec![ContentBlock::Text(TextContent::new("done"))]))
        }
    }

    struct Captured(Arc<std::sync::Mutex<Vec<JsonRpcNotification>>>);

    impl mcp_core::NotificationSink for Captured {
        fn send(&self, notification: JsonRpcNotification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    #[tokio::test]
    async fn progress_token_in_meta_reaches_the_attached_sink() {
        let server = server();
        server
            .register_tool(
                ToolDescriptor {
                    name: "report".into(),
                    title: None,
                    description: None,
                    input_schema: serde_json::json!({"type": "object"}),
                    output_schema: None,
                    annotations: None,
                },
                Arc::new(Reporter),
            )
            .unwrap();

        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let cx = RequestContext::default().with_notifier(Arc::new(Captured(sent.clone())));

        let req = JsonRpcRequest::with_params(
            "tools/call",
            serde_json::json!({
                "name": "report",
                "arguments": {},
                "_meta": {"progressToken": "job-1"}
            }),
            RequestId::Number(8),
        )
        .unwrap();
        let resp = server.handle_request(req, cx).await;
        assert!(resp.is_success());

        let notifications = sent.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].method, "notifications/progress");
    }

    #[test]
    fn emit_log_respects_the_negotiated_threshold() {
        let server = server();
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let cx = RequestContext::default().with_notifier(Arc::new(Captured(sent.clone())));

        server.logging.set_level(crate::channels::LogLevel::Warning);
        server.emit_log(&cx, crate::channels::LogLevel::Debug, None, serde_json::json!("too quiet"));
        assert!(sent.lock().unwrap().is_empty());

        server.emit_log(
            &cx,
            crate::channels::LogLevel::Error,
            Some("tool-runner".into()),
            serde_json::json!("boom"),
        );
        let notifications = sent.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].method, "notifications/message");
        let params = notifications[0].params.as_ref().unwrap();
        assert_eq!(params["level"], "error");
        assert_eq!(params["logger"], "tool-runner");
        assert_eq!(params["data"], "boom");
    }

    #[tokio::test]
    async fn progress_without_a_token_is_a_silent_no_op() {
        let server = server();
        server
            .register_tool(
                ToolDescriptor {
                    name: "report".into(),
                    title: None,
                    description: None,
                    input_schema: serde_json::json!({"type": "object"}),
                    output_schema: None,
                    annotations: None,
                },
                Arc::new(Reporter),
            )
            .unwrap();

        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let cx = RequestContext::default().with_notifier(Arc::new(Captured(sent.clone())));

        let req = JsonRpcRequest::with_params(
            "tools/call",
            serde_json::json!({"name": "report", "arguments": {}}),
            RequestId::Number(9),
        )
        .unwrap();
        let resp = server.handle_request(req, cx).await;
        assert!(resp.is_success());
        assert!(sent.lock().unwrap().is_empty());
    }
}
