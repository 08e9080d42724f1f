//! Server-level errors that don't fit the per-request [`mcp_protocol::Error`]
//! shape: failures that happen while assembling or mounting a server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("tool registration failed: {0}")]
    Registry(#[from] mcp_core::RegistryError),

    #[error("mount prefix '{0}' is already in use")]
    PrefixAlreadyMounted(String),
}
