//! Side-channel state machines: small pieces of request-adjacent state
//! that aren't themselves capabilities, grouped here so [`crate::server::Server`]
//! stays focused on the capability registries.
//!
//! [`mcp_core::ProgressManager`] lives in `mcp-core` instead of here:
//! [`mcp_core::RequestContext`] holds an `Arc` of it directly so a tool
//! handler can report progress without a reference back to the server,
//! which would create a dependency `mcp-core` can't have on this crate.

mod cancellation;
mod completion;
mod logging;

pub use cancellation::{CancelFn, CancellationManager};
pub use completion::{CompletionProvider, CompletionRegistry};
pub use logging::{LogLevel, LoggingManager};
pub use mcp_core::ProgressManager;
