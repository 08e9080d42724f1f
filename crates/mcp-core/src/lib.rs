//! Runtime core of the MCP server/client: capability registries, the
//! per-request context threaded through handler calls, and the handler
//! traits capability authors implement.
//!
//! This crate knows nothing about JSON-RPC dispatch or transports — it's
//! the in-process runtime that `mcp-server` wires up to a dispatcher and
//! `mcp-client` wires up to an outbound connection.

pub mod context;
pub mod error;
pub mod handler;
pub mod progress;
pub mod registry;

pub use context::{NotificationSink, RequestContext, TransportType};
pub use error::RegistryError;
pub use handler::{FnToolHandler, PromptHandler, ResourceHandler, ToolHandler};
pub use progress::ProgressManager;
pub use registry::{PromptRegistry, ResourceRegistry, ToolRegistry};
