//! Result payload shapes for the operations that carry more than a bare
//! descriptor list: tool calls, resource reads, and prompt renders.
//! Shared between server (encodes these) and client (decodes these).

use serde::{Deserialize, Serialize};

use super::content::ContentBlock;
use super::prompts::PromptMessage;
use super::resources::{ResourceDescriptor, ResourceTemplateDescriptor};
use super::tools::ToolDescriptor;
use super::Cursor;

/// The result of `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Output content blocks
    pub content: Vec<ContentBlock>,
    /// Machine-readable structured output, when the tool declares an
    /// `outputSchema`
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
    /// Whether the tool reported a failure. Distinct from a JSON-RPC
    /// error: a failed tool call is still a successful RPC.
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not", default)]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn ok(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            structured_content: None,
            is_error: false,
        }
    }

    pub fn error(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            structured_content: None,
            is_error: true,
        }
    }

    /// Build a successful result from a handler's raw return value,
    /// running it through [`super::content::content_from_value`] instead
    /// of requiring the caller to build content blocks by hand.
    pub fn from_raw(value: serde_json::Value) -> Self {
        Self::ok(super::content::content_from_value(value))
    }
}

/// The result of `resources/read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<super::content::ResourceContent>,
}

/// The result of `prompts/get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPromptResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

/// The result of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// The result of `resources/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourcesResult {
    pub resources: Vec<ResourceDescriptor>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// The result of `resources/templates/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourceTemplatesResult {
    #[serde(rename = "resourceTemplates")]
    pub resource_templates: Vec<ResourceTemplateDescriptor>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// The result of `prompts/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPromptsResult {
    pub prompts: Vec<super::prompts::PromptDescriptor>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}
