//! HTTP dispatch errors.
//!
//! A route method or middleware that fails is converted to a JSON error
//! envelope at the dispatch boundary; the process keeps serving.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Failure with an explicit status code.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status {
            status: 400,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Status {
            status: 404,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::MethodNotAllowed => 405,
            Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request() {
        let err = HttpError::bad_request("missing field");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "missing field");
    }

    #[test]
    fn test_internal_status() {
        assert_eq!(HttpError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_method_not_allowed() {
        assert_eq!(HttpError::MethodNotAllowed.status_code(), 405);
    }
}
