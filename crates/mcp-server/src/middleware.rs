//! A small before/after middleware chain wrapped around request dispatch.
//!
//! `before` hooks run outermost-first; `after` hooks run in reverse, so a
//! middleware added first wraps everything added after it, the way a
//! logging middleware should see a request before an auth middleware
//! rejects it, and see the final response after every other middleware
//! has had a chance to modify it.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;

use mcp_core::RequestContext;
use mcp_protocol::{JsonRpcRequest, JsonRpcResponse};

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Inspect or short-circuit a request before it reaches dispatch.
    /// Returning `Some(response)` skips dispatch and every remaining
    /// `before` hook entirely.
    async fn before(
        &self,
        _request: &JsonRpcRequest,
        _cx: &RequestContext,
    ) -> Option<JsonRpcResponse> {
        None
    }

    /// Inspect or modify the response after dispatch (or after an earlier
    /// middleware short-circuited).
    async fn after(&self, _response: &mut JsonRpcResponse, _cx: &RequestContext) {}
}

/// Catches a panic raised while awaiting `dispatch` and turns it into an
/// `Internal` error instead of unwinding the task that's driving
/// `handle_request`. This is not expressible as a `before`/`after` hook
/// since neither runs *around* dispatch itself — it wraps the dispatch
/// future directly and is always applied, outermost, regardless of what
/// else is in a server's middleware chain.
pub(crate) async fn dispatch_with_recovery<F>(dispatch: F) -> mcp_protocol::Result<serde_json::Value>
where
    F: std::future::Future<Output = mcp_protocol::Result<serde_json::Value>>,
{
    match AssertUnwindSafe(dispatch).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(&panic);
            tracing::error!(panic = %message, "dispatch panicked");
            Err(mcp_protocol::Error::Internal(format!(
                "handler panicked: {message}"
            )))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

pub(crate) async fn run_before(
    chain: &[std::sync::Arc<dyn Middleware>],
    request: &JsonRpcRequest,
    cx: &RequestContext,
) -> Option<JsonRpcResponse> {
    for mw in chain {
        if let Some(resp) = mw.before(request, cx).await {
            return Some(resp);
        }
    }
    None
}

pub(crate) async fn run_after(
    chain: &[std::sync::Arc<dyn Middleware>],
    response: &mut JsonRpcResponse,
    cx: &RequestContext,
) {
    for mw in chain.iter().rev() {
        mw.after(response, cx).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::RequestId;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn before(
            &self,
            _request: &JsonRpcRequest,
            _cx: &RequestContext,
        ) -> Option<JsonRpcResponse> {
            Some(JsonRpcResponse::success(
                serde_json::json!("short-circuited"),
                RequestId::Number(1),
            ))
        }
    }

    struct Marker(Arc<AtomicBool>);

    #[async_trait]
    impl Middleware for Marker {
        async fn before(
            &self,
            _request: &JsonRpcRequest,
            _cx: &RequestContext,
        ) -> Option<JsonRpcResponse> {
            self.0.store(true, Ordering::SeqCst);
            None
        }
    }

    #[tokio::test]
    async fn short_circuit_skips_remaining_before_hooks() {
        let ran = Arc::new(AtomicBool::new(false));
        let chain: Vec<std::sync::Arc<dyn Middleware>> = vec![
            Arc::new(ShortCircuit),
            Arc::new(Marker(ran.clone())),
        ];
        let req = JsonRpcRequest::new("ping", None, RequestId::Number(1));
        let cx = RequestContext::default();
        let resp = run_before(&chain, &req, &cx).await;
        assert!(resp.is_some());
        assert!(!ran.load(Ordering::SeqCst));
    }
}
