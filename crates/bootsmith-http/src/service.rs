//! The HTTP transport service.
//!
//! Owns its own [`RouterCell`] and mounts it as the shared listener's
//! fallback at boot. Route registrations after boot (extensions) rebuild
//! the inner router and swap it in place; the listener itself is never
//! touched.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bootsmith_artifacts::{HttpMiddleware, Route};
use bootsmith_core::error::ServiceError;
use bootsmith_core::{BootContext, Container, RouterCell, Service};
use bootsmith_loader::Catalog;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dispatch::build_router;

pub const SERVICE_NAME: &str = "http";

pub struct HttpService {
    body_limit: usize,
    routes: RwLock<Vec<(String, Arc<dyn Route>)>>,
    middlewares: RwLock<Catalog<dyn HttpMiddleware>>,
    raw: RwLock<Vec<(String, Router)>>,
    inner: RouterCell,
    container: OnceCell<Arc<Container>>,
}

impl HttpService {
    pub fn new(
        routes: Catalog<dyn Route>,
        middlewares: Catalog<dyn HttpMiddleware>,
        body_limit: usize,
    ) -> Self {
        let routes = routes
            .iter()
            .map(|(path, route)| (path.to_string(), route.clone()))
            .collect();
        Self {
            body_limit,
            routes: RwLock::new(routes),
            middlewares: RwLock::new(middlewares),
            raw: RwLock::new(Vec::new()),
            inner: RouterCell::new(),
            container: OnceCell::new(),
        }
    }

    /// Register routes after boot; the live router is rebuilt in place.
    /// Extensions use this to add their own endpoints.
    pub fn register_routes(&self, routes: Vec<(String, Arc<dyn Route>)>) {
        self.routes.write().extend(routes);
        self.rebuild();
    }

    /// Register a named middleware after boot.
    pub fn register_middleware(&self, name: impl Into<String>, middleware: Arc<dyn HttpMiddleware>) {
        self.middlewares.write().register(name, middleware);
        self.rebuild();
    }

    /// Mount an opaque sub-router under a prefix. Requests to it bypass
    /// the middleware chain and the response envelope entirely.
    pub fn register_raw(&self, prefix: impl Into<String>, router: Router) {
        self.raw.write().push((prefix.into(), router));
        self.rebuild();
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().len()
    }

    fn rebuild(&self) {
        let Some(container) = self.container.get() else {
            // Not booted yet; boot does the first build.
            return;
        };
        let routes = self.routes.read().clone();
        let middlewares = self.middlewares.read();
        let mut router = build_router(container.clone(), &routes, &middlewares, self.body_limit);
        for (prefix, raw) in self.raw.read().iter() {
            router = router.nest(prefix, raw.clone());
        }
        self.inner.set(
            router
                .layer(CorsLayer::permissive())
                .layer(TraceLayer::new_for_http()),
        );
    }
}

#[async_trait]
impl Service for HttpService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, ctx: &BootContext) -> Result<(), ServiceError> {
        let server = ctx.require_http()?;
        if self.container.set(ctx.container.clone()).is_err() {
            return Err(ServiceError::Config("HTTP service booted twice".to_string()));
        }
        self.rebuild();
        server
            .router_cell()
            .merge(Router::new().fallback_service(self.inner.clone()));
        info!(
            "HTTP service mounted {} routes on http://{}",
            self.route_count(),
            server.local_addr()
        );
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
