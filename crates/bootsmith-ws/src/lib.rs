//! # Bootsmith WS
//!
//! WebSocket transport: the `/ws` endpoint, per-connection session
//! loops and named-event dispatch through guards and handlers.

pub mod service;
mod session;

pub use service::{SocketService, SERVICE_NAME, SOCKET_PATH};
