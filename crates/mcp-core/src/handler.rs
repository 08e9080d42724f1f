//! Handler traits implemented by tool/resource/prompt authors.
//!
//! A handler owns no identity of its own — its name, schema, and
//! description live in the descriptor it's registered alongside. The
//! trait is only the callable surface.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use mcp_protocol::{CallToolResult, GetPromptResult, ReadResourceResult};

use crate::context::RequestContext;

/// A callable tool body.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Invoke the tool with its already-validated arguments.
    async fn call(
        &self,
        arguments: Value,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<CallToolResult>;
}

/// A callable resource body, serving either a fixed URI or a family of
/// URIs matched by a template.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Read the resource. `uri` is the concrete URI requested; `params`
    /// holds the named captures extracted from a template match (empty
    /// for a static resource).
    async fn read(
        &self,
        uri: &str,
        params: &HashMap<String, String>,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<ReadResourceResult>;
}

/// A callable prompt renderer.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    /// Render the prompt with its arguments (already checked against
    /// required-argument declarations by the registry).
    async fn render(
        &self,
        arguments: &HashMap<String, String>,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<GetPromptResult>;
}

/// A tool handler built from a plain closure, for the common case where
/// a full trait impl is overkill.
pub struct FnToolHandler<F>(pub F);

#[async_trait]
impl<F, Fut> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value, RequestContext) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = mcp_protocol::Result<CallToolResult>> + Send,
{
    async fn call(
        &self,
        arguments: Value,
        cx: &RequestContext,
    ) -> mcp_protocol::Result<CallToolResult> {
        (self.0)(arguments, cx.clone()).await
    }
}
