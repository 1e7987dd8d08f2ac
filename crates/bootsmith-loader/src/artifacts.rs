//! Application artifact bundle.

use std::sync::Arc;

use bootsmith_artifacts::{
    ConnectionHandler, Event, Guard, Handler, HttpMiddleware, Route, Schedule, Worker,
};

use crate::catalog::Catalog;
use crate::paths;

/// Everything an application registers with the kernel, grouped by the
/// service that consumes it. Built before boot, then handed to the
/// built-in service factories.
#[derive(Default)]
pub struct Artifacts {
    pub routes: Catalog<dyn Route>,
    pub middlewares: Catalog<dyn HttpMiddleware>,
    pub guards: Catalog<dyn Guard>,
    pub handlers: Catalog<dyn Handler>,
    pub connection: Option<Arc<dyn ConnectionHandler>>,
    pub workers: Catalog<dyn Worker>,
    pub schedules: Catalog<dyn Schedule>,
    pub events: Catalog<dyn Event>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route at an explicit path.
    pub fn route(&mut self, path: impl Into<String>, route: Arc<dyn Route>) -> &mut Self {
        self.routes.register(path, route);
        self
    }

    /// Register a route with its path derived from a file-style name
    /// (`[id]/message` → `/{id}/message`, `index` → `/`).
    pub fn route_file(&mut self, file: &str, route: Arc<dyn Route>) -> &mut Self {
        self.routes.register(paths::route_path(file), route);
        self
    }

    pub fn middleware(
        &mut self,
        name: impl Into<String>,
        middleware: Arc<dyn HttpMiddleware>,
    ) -> &mut Self {
        self.middlewares.register(name, middleware);
        self
    }

    pub fn guard(&mut self, name: impl Into<String>, guard: Arc<dyn Guard>) -> &mut Self {
        self.guards.register(name, guard);
        self
    }

    /// Register a handler for a socket event name.
    pub fn handler(&mut self, event: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.register(event, handler);
        self
    }

    /// Set the mandatory connection handler for the socket service.
    pub fn connection(&mut self, handler: Arc<dyn ConnectionHandler>) -> &mut Self {
        self.connection = Some(handler);
        self
    }

    pub fn worker(&mut self, name: impl Into<String>, worker: Arc<dyn Worker>) -> &mut Self {
        self.workers.register(name, worker);
        self
    }

    pub fn schedule(&mut self, name: impl Into<String>, schedule: Arc<dyn Schedule>) -> &mut Self {
        self.schedules.register(name, schedule);
        self
    }

    pub fn event(&mut self, name: impl Into<String>, event: Arc<dyn Event>) -> &mut Self {
        self.events.register(name, event);
        self
    }
}
