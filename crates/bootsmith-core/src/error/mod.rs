//! Error types, one enum per domain.

mod container;
mod database;
mod event;
mod http;
mod kernel;
mod queue;
mod socket;
mod storage;
mod template;

pub use container::ContainerError;
pub use database::DatabaseError;
pub use event::EventError;
pub use http::HttpError;
pub use kernel::{ExtensionError, KernelError, ServiceError};
pub use queue::QueueError;
pub use socket::SocketError;
pub use storage::StorageError;
pub use template::TemplateError;
