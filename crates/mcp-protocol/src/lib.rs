//! Wire-level types for the Model Context Protocol: the JSON-RPC 2.0
//! envelope and the MCP capability entities (tools, resources, prompts,
//! content blocks, capability negotiation) layered on top of it.
//!
//! This crate has no I/O and no registries — it's the vocabulary that
//! `mcp-core`, `mcp-server`, `mcp-client`, and the transport crates all
//! share so that a request decoded on one side of the wire means the
//! same thing on the other.

pub mod error;
pub mod jsonrpc;
pub mod types;

pub use error::Error;
pub use jsonrpc::{
    JsonRpcBatch, JsonRpcError, JsonRpcErrorCode, JsonRpcInboundItem, JsonRpcMessage,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponsePayload, JsonRpcVersion,
    ResponseId, JSONRPC_VERSION,
};
pub use types::*;

/// Convenience alias for fallible operations returning a protocol [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
