//! Routes every inbound message from the transport to the right place:
//! responses to their waiting `request()` call, server-initiated
//! requests to the registered [`ServerRequestHandler`], notifications to
//! a registered callback. This is the single consumer of
//! `transport.receive()` — centralizing it here is what makes
//! concurrent outbound requests and inbound pushes safe to interleave.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};

use mcp_protocol::{
    Error as ProtocolError, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RequestId,
};

use crate::server_request::{CreateMessageParams, ServerRequestHandler};
use crate::transport::{ClientTransport, Inbound};

type NotificationHandler = Arc<dyn Fn(JsonRpcNotification) + Send + Sync>;

/// Background router plus request-id correlation table.
pub struct MessageDispatcher {
    transport: Arc<dyn ClientTransport>,
    response_waiters: Mutex<HashMap<RequestId, oneshot::Sender<JsonRpcResponse>>>,
    server_request_handler: Mutex<Option<Arc<dyn ServerRequestHandler>>>,
    notification_handler: Mutex<Option<NotificationHandler>>,
    next_id: AtomicI64,
    shutdown: Notify,
}

impl MessageDispatcher {
    /// Construct the dispatcher and immediately start its background
    /// routing task.
    pub fn spawn(transport: Arc<dyn ClientTransport>) -> Arc<Self> {
        let dispatcher = Arc::new(Self {
            transport,
            response_waiters: Mutex::new(HashMap::new()),
            server_request_handler: Mutex::new(None),
            notification_handler: Mutex::new(None),
            next_id: AtomicI64::new(1),
            shutdown: Notify::new(),
        });
        Self::spawn_routing_task(dispatcher.clone());
        dispatcher
    }

    pub fn set_server_request_handler(&self, handler: Arc<dyn ServerRequestHandler>) {
        *self.server_request_handler.lock() = Some(handler);
    }

    pub fn set_notification_handler(&self, handler: NotificationHandler) {
        *self.notification_handler.lock() = Some(handler);
    }

    /// Allocate a fresh, unique request id.
    pub fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a waiter for `id`'s response, then send the request.
    /// Dropping the returned receiver before the response arrives
    /// abandons the waiter; a late response for it is then silently
    /// dropped by the routing task.
    pub async fn request(
        &self,
        request: JsonRpcRequest,
    ) -> mcp_protocol::Result<oneshot::Receiver<JsonRpcResponse>> {
        let (tx, rx) = oneshot::channel();
        self.response_waiters.lock().insert(request.id.clone(), tx);
        if let Err(err) = self.transport.send_request(request.clone()).await {
            self.response_waiters.lock().remove(&request.id);
            return Err(err);
        }
        Ok(rx)
    }

    /// Abandon a pending request, e.g. because the caller's own
    /// cancellation fired before a response arrived.
    pub fn abandon(&self, id: &RequestId) {
        self.response_waiters.lock().remove(id);
    }

    pub async fn notify(&self, notification: JsonRpcNotification) -> mcp_protocol::Result<()> {
        self.transport.send_notification(notification).await
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    fn spawn_routing_task(dispatcher: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = dispatcher.shutdown.notified() => {
                        tracing::debug!("client dispatcher shutting down");
                        break;
                    }
                    received = dispatcher.transport.receive() => {
                        match received {
                            Ok(Some(message)) => dispatcher.route(message).await,
                            Ok(None) => {
                                tracing::debug!("transport closed, dispatcher exiting");
                                break;
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "transport receive failed");
                                break;
                            }
                        }
                    }
                }
            }
        });
    }

    async fn route(&self, message: Inbound) {
        match message {
            Inbound::Response(response) => {
                let Some(id) = response.request_id().cloned() else {
                    tracing::warn!("dropping response with null id");
                    return;
                };
                if let Some(waiter) = self.response_waiters.lock().remove(&id) {
                    let _ = waiter.send(response);
                } else {
                    tracing::trace!(?id, "response for unknown or abandoned request");
                }
            }
            Inbound::Request(request) => self.handle_server_request(request).await,
            Inbound::Notification(notification) => {
                if let Some(handler) = self.notification_handler.lock().clone() {
                    handler(notification);
                }
            }
        }
    }

    async fn handle_server_request(&self, request: JsonRpcRequest) {
        let handler = self.server_request_handler.lock().clone();
        let id = request.id.clone();

        let result = match handler {
            None => Err(ProtocolError::MethodNotFound(request.method.clone())),
            Some(handler) => self.dispatch_server_request(&handler, request).await,
        };

        let response = match result {
            Ok(value) => JsonRpcResponse::success(value, id),
            Err(err) => JsonRpcResponse::error_response(JsonRpcError::from(err), id),
        };

        if let Err(err) = self.transport.send_response(response).await {
            tracing::warn!(error = %err, "failed to send response to server-initiated request");
        }
    }

    async fn dispatch_server_request(
        &self,
        handler: &Arc<dyn ServerRequestHandler>,
        request: JsonRpcRequest,
    ) -> mcp_protocol::Result<serde_json::Value> {
        match request.method.as_str() {
            "roots/list" => {
                let result = handler.list_roots().await?;
                Ok(serde_json::to_value(result).expect("ListRootsResult always serializes"))
            }
            "sampling/createMessage" => {
                let params: CreateMessageParams = serde_json::from_value(
                    request.params.unwrap_or(serde_json::Value::Null),
                )
                .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;
                let result = handler.create_message(params).await?;
                Ok(serde_json::to_value(result).expect("CreateMessageResult always serializes"))
            }
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_request::{CreateMessageResult, ListRootsResult};
    use mcp_protocol::{ContentBlock, Role, TextContent};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    struct FakeTransport {
        outbound: StdMutex<Vec<JsonRpcResponse>>,
        inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>,
    }

    #[async_trait::async_trait]
    impl ClientTransport for FakeTransport {
        async fn send_request(&self, _request: JsonRpcRequest) -> mcp_protocol::Result<()> {
            Ok(())
        }
        async fn send_notification(&self, _n: JsonRpcNotification) -> mcp_protocol::Result<()> {
            Ok(())
        }
        async fn send_response(&self, response: JsonRpcResponse) -> mcp_protocol::Result<()> {
            self.outbound.lock().unwrap().push(response);
            Ok(())
        }
        async fn receive(&self) -> mcp_protocol::Result<Option<Inbound>> {
            Ok(self.inbound.lock().await.recv().await)
        }
    }

    struct EchoRoots;

    #[async_trait::async_trait]
    impl ServerRequestHandler for EchoRoots {
        async fn list_roots(&self) -> mcp_protocol::Result<ListRootsResult> {
            Ok(ListRootsResult { roots: vec![] })
        }
        async fn create_message(
            &self,
            _params: CreateMessageParams,
        ) -> mcp_protocol::Result<CreateMessageResult> {
            Ok(CreateMessageResult {
                role: Role::Assistant,
                content: ContentBlock::Text(TextContent::new("hi")),
                model: "test-model".into(),
                stop_reason: Some("endTurn".into()),
            })
        }
    }

    #[tokio::test]
    async fn response_resolves_matching_waiter() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(FakeTransport {
            outbound: StdMutex::new(Vec::new()),
            inbound: tokio::sync::Mutex::new(rx),
        });
        let dispatcher = MessageDispatcher::spawn(transport);

        let req = JsonRpcRequest::new("ping", None, RequestId::Number(1));
        let waiter = dispatcher.request(req).await.unwrap();

        tx.send(Inbound::Response(JsonRpcResponse::success(
            serde_json::json!({}),
            RequestId::Number(1),
        )))
        .unwrap();

        let response = waiter.await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn server_initiated_request_routes_to_handler() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(FakeTransport {
            outbound: StdMutex::new(Vec::new()),
            inbound: tokio::sync::Mutex::new(rx),
        });
        let dispatcher = MessageDispatcher::spawn(transport.clone());
        dispatcher.set_server_request_handler(Arc::new(EchoRoots));

        tx.send(Inbound::Request(JsonRpcRequest::new(
            "roots/list",
            None,
            RequestId::Number(7),
        )))
        .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let sent = transport.outbound.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].is_success());
    }

    #[tokio::test]
    async fn request_to_unregistered_handler_is_method_not_found() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(FakeTransport {
            outbound: StdMutex::new(Vec::new()),
            inbound: tokio::sync::Mutex::new(rx),
        });
        let dispatcher = MessageDispatcher::spawn(transport.clone());

        tx.send(Inbound::Request(JsonRpcRequest::new(
            "roots/list",
            None,
            RequestId::Number(8),
        )))
        .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let sent = transport.outbound.lock().unwrap();
        assert_eq!(sent[0].error().unwrap().code, -32601);
    }
}
