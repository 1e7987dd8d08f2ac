//! Container-related errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service not found: {0}")]
    NotFound(String),

    #[error("Service already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Container is compiled, cannot register: {0}")]
    Compiled(String),

    #[error("Service {0} is not of the requested type")]
    WrongType(String),

    #[error("Failed to construct service {name}: {message}")]
    Construction { name: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ContainerError::NotFound("cache".to_string());
        let display = err.to_string();
        assert!(display.contains("not found"));
        assert!(display.contains("cache"));
    }

    #[test]
    fn test_compiled_display() {
        let err = ContainerError::Compiled("late".to_string());
        assert!(err.to_string().contains("compiled"));
    }

    #[test]
    fn test_construction_display() {
        let err = ContainerError::Construction {
            name: "database".to_string(),
            message: "missing url".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("database"));
        assert!(display.contains("missing url"));
    }
}
