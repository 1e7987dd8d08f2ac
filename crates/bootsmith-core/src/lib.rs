//! # Bootsmith Core
//!
//! The dependency-injection heart of bootsmith: the service container,
//! the kernel that boots registered services in order, and the shared
//! HTTP listener that the transport services mount themselves on.

pub mod container;
pub mod error;
pub mod extension;
pub mod kernel;
pub mod server;
pub mod service;

pub use container::{ArgValue, Container, ResolvedArgs, ServiceDescriptor};
pub use extension::Extension;
pub use kernel::{Kernel, KernelState};
pub use server::{HttpServer, RouterCell, ShutdownSignal};
pub use service::{BootContext, Service};
