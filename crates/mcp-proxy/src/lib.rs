//! Remote capability reflection: builds a local [`mcp_server::Server`]
//! whose registries mirror a connected [`mcp_client::Client`]'s remote
//! server, forwarding every call back across the client.

pub mod error;
pub mod forward;
pub mod proxy;

pub use error::ProxyError;
pub use forward::{ForwardingPromptHandler, ForwardingResourceHandler, ForwardingToolHandler};
pub use proxy::ProxyServer;
