//! HTTP route contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::HttpError;
use bootsmith_core::Container;
use bytes::Bytes;
use serde_json::Value;

/// HTTP verbs a route can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// What a route method hands back to the dispatcher.
///
/// `Json` values get the `success` flag injected (default `true`) and an
/// optional `status` field controls the HTTP status code. `Binary`
/// becomes a file-attachment response and `Redirect` an HTTP redirect.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Binary {
        filename: String,
        content_type: String,
        bytes: Bytes,
    },
    Redirect(String),
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self::Json(value)
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect(url.into())
    }

    pub fn attachment(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self::Binary {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// The parts of an inbound request a route method sees.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub path: String,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

/// Per-request context passed through the middleware chain into the
/// route method. Middlewares may mutate it (e.g. attach decoded auth
/// data to `headers` or rewrite `body`).
pub struct RouteContext {
    pub container: Arc<Container>,
    pub request: RequestParts,
}

/// An HTTP endpoint.
///
/// `methods` declares which verbs are served; only declared verbs are
/// registered with the router. The per-verb middleware list is a list of
/// names resolved against the loaded middleware catalog.
#[async_trait]
pub trait Route: Send + Sync + 'static {
    fn methods(&self) -> Vec<Method>;

    fn middlewares(&self, _method: Method) -> Vec<String> {
        Vec::new()
    }

    async fn get(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Err(HttpError::MethodNotAllowed)
    }

    async fn post(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Err(HttpError::MethodNotAllowed)
    }

    async fn put(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Err(HttpError::MethodNotAllowed)
    }

    async fn delete(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Err(HttpError::MethodNotAllowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_attachment_reply() {
        let reply = Reply::attachment("report.csv", "text/csv", "a,b\n");
        match reply {
            Reply::Binary {
                filename,
                content_type,
                bytes,
            } => {
                assert_eq!(filename, "report.csv");
                assert_eq!(content_type, "text/csv");
                assert_eq!(bytes.as_ref(), b"a,b\n");
            }
            _ => panic!("expected binary reply"),
        }
    }
}
