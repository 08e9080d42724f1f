//! Errors a proxy can hit while mirroring a remote server's capability
//! lists into its own registries.

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("listing remote capabilities failed: {0}")]
    Remote(#[from] mcp_protocol::Error),
    #[error("registering a reflected capability failed: {0}")]
    Registry(#[from] mcp_core::RegistryError),
}

impl From<ProxyError> for mcp_protocol::Error {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Remote(e) => e,
            ProxyError::Registry(e) => e.into(),
        }
    }
}
