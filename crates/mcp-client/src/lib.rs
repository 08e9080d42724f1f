//! Client-side runtime: a single-consumer message dispatcher that
//! correlates outbound requests with their responses and routes
//! server-initiated requests (`roots/list`, `sampling/createMessage`)
//! and notifications, plus the [`Client`] handle built on top of it.

pub mod client;
pub mod dispatcher;
pub mod server_request;
pub mod transport;

pub use client::Client;
pub use dispatcher::MessageDispatcher;
pub use server_request::{
    CreateMessageParams, CreateMessageResult, ListRootsResult, Root, SamplingMessage,
    ServerRequestHandler,
};
pub use transport::{ClientTransport, Inbound};
