//! JSON-RPC dispatch for MCP servers: decodes requests against the
//! method table, routes them to [`mcp_core`]'s registries, negotiates
//! capabilities on `initialize`, and exposes composition so several
//! servers can be mounted behind one endpoint.

pub mod channels;
pub mod composite;
pub mod error;
pub mod middleware;
mod params;
pub mod server;

pub use composite::CompositeServer;
pub use error::ServerError;
pub use middleware::Middleware;
pub use server::Server;
