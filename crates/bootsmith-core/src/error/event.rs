//! Event bus errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Event {name} timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    #[error("Event handler failed: {0}")]
    Handler(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = EventError::Timeout {
            name: "user.created".to_string(),
            timeout_ms: 10,
        };
        let display = err.to_string();
        assert!(display.contains("user.created"));
        assert!(display.contains("10ms"));
    }

    #[test]
    fn test_not_found_display() {
        let err = EventError::NotFound("ghost".to_string());
        assert!(err.to_string().contains("ghost"));
    }
}
