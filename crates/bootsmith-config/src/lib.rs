//! # Bootsmith Config
//!
//! Configuration management for the bootsmith kernel.
//!
//! Service enablement is configuration-driven: a backing service is
//! registered only when its required settings are present, and the
//! transport/scheduler/event services can be disabled with boolean flags.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
