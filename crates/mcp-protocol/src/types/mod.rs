//! MCP capability entity types.
//!
//! These are the data shapes carried over the wire: tool/resource/prompt
//! descriptors, content blocks, and capability negotiation structures.
//! None of them carry handlers — handlers live in `mcp-core`'s registries.

mod capabilities;
mod content;
mod core;
mod prompts;
mod resources;
mod results;
mod tools;

pub use capabilities::{
    ClientCapabilities, Implementation, PromptsCapability, ResourcesCapability, RootsCapability,
    ServerCapabilities, ToolsCapability, PROTOCOL_VERSION,
};
pub use content::{
    content_from_value, AudioContent, BlobResourceContents, ContentBlock, EmbeddedResource,
    ImageContent, ResourceContent, ResourceLink, TextContent, TextResourceContents,
};
pub use core::{Cursor, ProgressToken, RequestId};
pub use prompts::{PromptArgument, PromptDescriptor, PromptMessage, Role};
pub use resources::{ResourceDescriptor, ResourceTemplateDescriptor};
pub use results::{
    CallToolResult, GetPromptResult, ListPromptsResult, ListResourceTemplatesResult,
    ListResourcesResult, ListToolsResult, ReadResourceResult,
};
pub use tools::{ToolDescriptor, ToolHints};
