//! WebSocket dispatch errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Guard {0} rejected the connection")]
    GuardRejected(String),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejected_display() {
        let err = SocketError::GuardRejected("auth".to_string());
        assert!(err.to_string().contains("auth"));
    }
}
