//! The streamable HTTP transport: a single `/mcp` endpoint multiplexing
//! POST-delivered JSON-RPC and a GET-bound SSE stream for
//! server-initiated pushes, session identity, and the client-side
//! [`mcp_client::ClientTransport`] implementation that speaks it.

pub mod client;
pub mod server;
pub mod session;
pub mod sse;

pub use client::StreamableHttpClientTransport;
pub use server::{router, AppState, OriginPolicy};
pub use session::{Session, SessionId, SessionStore};
pub use sse::{SseDecoder, SseEvent};
