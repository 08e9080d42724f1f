//! Primitive types shared across the MCP wire format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON-RPC request identifier: either a string or an integer.
///
/// The MCP wire format allows either representation; we preserve whichever
/// one the peer sent rather than normalizing, since id equality must be
/// byte-for-byte for correlation to work against non-Rust peers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Opaque pagination cursor, passed through list operations unexamined.
pub type Cursor = String;

/// A progress token correlating `notifications/progress` to the request
/// that triggered them. Either a client-chosen string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    /// String token
    String(String),
    /// Numeric token
    Number(i64),
}
