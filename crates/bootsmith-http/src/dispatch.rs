//! Route dispatch.
//!
//! Builds an axum [`Router`] out of the route catalog. Each registered
//! verb gets a handler that extracts the request into [`RequestParts`],
//! runs the route's middleware chain, invokes the verb method and
//! serializes the [`Reply`] into the JSON envelope.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{FromRequestParts, Path, Request};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{on, MethodFilter};
use axum::{Json, Router};
use bootsmith_artifacts::{HttpMiddleware, Method, Reply, RequestParts, Route, RouteContext};
use bootsmith_core::error::HttpError;
use bootsmith_core::Container;
use bootsmith_loader::Catalog;
use futures::FutureExt;
use serde_json::{json, Map, Value};
use tracing::{error, warn};

/// Build a router serving every `(path, route)` pair.
///
/// Duplicate paths follow catalog policy: the last registration wins.
/// Middleware names that resolve against nothing are reported here, at
/// build time, and skipped at dispatch time.
pub fn build_router(
    container: Arc<Container>,
    routes: &[(String, Arc<dyn Route>)],
    middlewares: &Catalog<dyn HttpMiddleware>,
    body_limit: usize,
) -> Router {
    let mut deduped: Vec<(String, Arc<dyn Route>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (path, route) in routes {
        match positions.get(path) {
            Some(&position) => {
                warn!("Duplicate route path {}, last registration wins", path);
                deduped[position].1 = route.clone();
            }
            None => {
                positions.insert(path.clone(), deduped.len());
                deduped.push((path.clone(), route.clone()));
            }
        }
    }

    let mut router = Router::new();
    for (path, route) in deduped {
        let mut registered: Vec<Method> = Vec::new();
        for method in route.methods() {
            if registered.contains(&method) {
                continue;
            }
            registered.push(method);

            let chain = resolve_chain(&path, method, route.as_ref(), middlewares);
            let route = route.clone();
            let container = container.clone();
            let handler = move |req: Request| {
                let route = route.clone();
                let chain = chain.clone();
                let container = container.clone();
                async move { dispatch(container, route, chain, method, body_limit, req).await }
            };
            router = router.route(&path, on(method_filter(method), handler));
        }
    }
    router
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Put => MethodFilter::PUT,
        Method::Delete => MethodFilter::DELETE,
    }
}

fn resolve_chain(
    path: &str,
    method: Method,
    route: &dyn Route,
    middlewares: &Catalog<dyn HttpMiddleware>,
) -> Vec<Arc<dyn HttpMiddleware>> {
    let mut chain = Vec::new();
    for name in route.middlewares(method) {
        match middlewares.get(&name) {
            Some(middleware) => chain.push(middleware),
            None => warn!(
                "{} {} references unknown middleware {}, skipping",
                method.as_str(),
                path,
                name
            ),
        }
    }
    chain
}

async fn dispatch(
    container: Arc<Container>,
    route: Arc<dyn Route>,
    chain: Vec<Arc<dyn HttpMiddleware>>,
    method: Method,
    body_limit: usize,
    req: Request,
) -> Response {
    let request = match extract_parts(req, body_limit).await {
        Ok(parts) => parts,
        Err(response) => return response,
    };
    let mut ctx = RouteContext { container, request };

    for middleware in &chain {
        if let Err(e) = middleware.handle(&mut ctx).await {
            return error_envelope(&e);
        }
    }

    let call = async {
        match method {
            Method::Get => route.get(ctx).await,
            Method::Post => route.post(ctx).await,
            Method::Put => route.put(ctx).await,
            Method::Delete => route.delete(ctx).await,
        }
    };
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(reply)) => reply_response(reply),
        Ok(Err(e)) => error_envelope(&e),
        Err(_) => {
            error!("Route handler panicked");
            error_envelope(&HttpError::internal("route handler panicked"))
        }
    }
}

/// Flatten the inbound request into [`RequestParts`].
///
/// The body is decoded as JSON only when the content type says so;
/// anything else (and an empty body) becomes `Value::Null`.
async fn extract_parts(req: Request, body_limit: usize) -> Result<RequestParts, Response> {
    let (mut head, body) = req.into_parts();

    let params = match Path::<HashMap<String, String>>::from_request_parts(&mut head, &()).await {
        Ok(Path(params)) => params,
        Err(_) => HashMap::new(),
    };

    let query = head
        .uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect::<HashMap<String, String>>()
        })
        .unwrap_or_default();

    let headers = head
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let is_json = head
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("json"))
        .unwrap_or(false);

    let bytes = to_bytes(body, body_limit).await.map_err(|_| {
        error_envelope(&HttpError::Status {
            status: 413,
            message: "Request body too large".to_string(),
        })
    })?;
    let body = if bytes.is_empty() || !is_json {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|_| error_envelope(&HttpError::bad_request("Invalid JSON body")))?
    };

    Ok(RequestParts {
        path: head.uri.path().to_string(),
        params,
        query,
        headers,
        body,
    })
}

fn reply_response(reply: Reply) -> Response {
    match reply {
        Reply::Json(value) => json_envelope(value),
        Reply::Redirect(url) => Redirect::temporary(&url).into_response(),
        Reply::Binary {
            filename,
            content_type,
            bytes,
        } => {
            let disposition = format!("attachment; filename=\"{}\"", filename);
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
    }
}

/// Wrap a JSON reply in the response envelope.
///
/// Objects get `success: true` injected unless the route already set
/// it; a `status` field picks the HTTP status and stays in the body.
/// Non-object values are wrapped under a `data` key.
fn json_envelope(value: Value) -> Response {
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    let status = object
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|code| StatusCode::from_u16(code as u16).ok())
        .unwrap_or(StatusCode::OK);
    object.entry("success").or_insert(Value::Bool(true));
    (status, Json(Value::Object(object))).into_response()
}

fn error_envelope(err: &HttpError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "success": false, "message": err.to_string() })),
    )
        .into_response()
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
