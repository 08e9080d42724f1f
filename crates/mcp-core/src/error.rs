//! Registry-level errors, separate from the wire-facing [`mcp_protocol::Error`]
//! since registration failures happen at startup, not per-request.

use thiserror::Error;

/// A failure registering or looking up a capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool registration used a name that already exists. Tool
    /// registration fails closed; the caller must pick a different name
    /// or unregister the existing one first.
    #[error("tool '{0}' is already registered")]
    ToolAlreadyExists(String),

    /// Lookup found nothing under this name or URI.
    #[error("{kind} '{name}' not found")]
    NotFound {
        kind: &'static str,
        name: String,
    },

    /// A resource template's `uriTemplate` failed to compile into a
    /// matcher, e.g. unbalanced `{}`.
    #[error("invalid URI template '{0}': {1}")]
    InvalidTemplate(String, String),

    /// A tool's `inputSchema` isn't a valid JSON Schema document, so it
    /// couldn't be compiled into a validator at registration time.
    #[error("invalid input schema for tool '{0}': {1}")]
    InvalidSchema(String, String),
}

impl From<RegistryError> for mcp_protocol::Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ToolAlreadyExists(name) => {
                mcp_protocol::Error::Internal(format!("tool '{name}' is already registered"))
            }
            RegistryError::NotFound { kind, name } => mcp_protocol::Error::NotFound { kind, name },
            RegistryError::InvalidTemplate(template, reason) => mcp_protocol::Error::Internal(
                format!("invalid URI template '{template}': {reason}"),
            ),
            RegistryError::InvalidSchema(name, reason) => mcp_protocol::Error::Internal(
                format!("invalid input schema for tool '{name}': {reason}"),
            ),
        }
    }
}
