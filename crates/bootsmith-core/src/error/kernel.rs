//! Kernel, service and extension lifecycle errors.

use thiserror::Error;

use super::{
    ContainerError, DatabaseError, EventError, HttpError, QueueError, StorageError, TemplateError,
};

/// Errors a service may surface while booting or serving.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid service configuration: {0}")]
    Config(String),

    #[error("Missing service argument at position {0}")]
    MissingArg(usize),

    #[error("Service argument at position {index} is not a {expected}")]
    ArgType { index: usize, expected: &'static str },

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid cron expression for schedule {name}: {message}")]
    InvalidCron { name: String, message: String },

    #[error("{0}")]
    Custom(String),
}

/// Errors surfaced by extensions during `load`.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("{0}")]
    Custom(String),
}

/// Fatal boot errors. Any of these aborts kernel startup entirely.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Service {name} failed to boot: {source}")]
    ServiceBoot {
        name: String,
        #[source]
        source: ServiceError,
    },

    #[error("Extension {name} failed to load: {source}")]
    Extension {
        name: String,
        #[source]
        source: ExtensionError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Server is already started")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_boot_display() {
        let err = KernelError::ServiceBoot {
            name: "database".to_string(),
            source: ServiceError::Config("bad url".to_string()),
        };
        let display = err.to_string();
        assert!(display.contains("database"));
        assert!(display.contains("failed to boot"));
    }

    #[test]
    fn test_arg_type_display() {
        let err = ServiceError::ArgType {
            index: 2,
            expected: "string",
        };
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn test_extension_custom_display() {
        let err = ExtensionError::Custom("boom".to_string());
        assert_eq!(err.to_string(), "boom");
    }
}
