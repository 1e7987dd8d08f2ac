//! Job queue errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue not found: {0}")]
    NotFound(String),

    #[error("Queue {0} is closed")]
    Closed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = QueueError::NotFound("mail".to_string());
        assert!(err.to_string().contains("mail"));
    }
}
