//! Protocol-level error kinds and their JSON-RPC error-code mapping.

use serde_json::Value;
use thiserror::Error;

use crate::jsonrpc::JsonRpcError;

/// A protocol-level failure, mapped to a standard JSON-RPC error code on
/// the wire. This is deliberately flat: callers match on variants rather
/// than inspecting a chained source, matching the wire contract in
/// `spec.md` §7.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Malformed JSON on the wire
    #[error("parse error: {0}")]
    Parse(String),

    /// Envelope well-formed but not a valid request/notification
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown method name
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Params failed to decode or failed schema validation
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Handler failure or panic recovery
    #[error("internal error: {0}")]
    Internal(String),

    /// A named tool/resource/prompt was not registered
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Which registry was queried: "tool", "resource", or "prompt"
        kind: &'static str,
        /// The name or URI that was looked up
        name: String,
    },

    /// JSON Schema validation rejected the arguments
    #[error("validation failed: {0}")]
    Validation(String),

    /// I/O failure on the underlying transport
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// The JSON-RPC error code this error maps to.
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) | Self::Validation(_) => -32602,
            Self::Internal(_) | Self::NotFound { .. } | Self::Transport(_) => -32603,
        }
    }

    /// Build a `data` payload for the error response, if any is useful
    /// beyond the message itself.
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::NotFound { kind, name } => {
                Some(serde_json::json!({ "kind": kind, "name": name }))
            }
            _ => None,
        }
    }
}

impl From<&Error> for JsonRpcError {
    fn from(err: &Error) -> Self {
        JsonRpcError {
            code: err.code(),
            message: err.to_string(),
            data: err.data(),
        }
    }
}

impl From<Error> for JsonRpcError {
    fn from(err: Error) -> Self {
        JsonRpcError::from(&err)
    }
}
