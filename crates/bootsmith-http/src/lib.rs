//! # Bootsmith HTTP
//!
//! HTTP transport: turns the loaded route catalog into a live axum
//! router behind the shared listener, with per-route middleware chains
//! and the JSON response envelope.

pub mod dispatch;
pub mod service;

pub use dispatch::build_router;
pub use service::{HttpService, SERVICE_NAME};
