//! Default application artifacts.
//!
//! The bundle served when the binary runs standalone: one route, one
//! middleware, a socket echo pipeline, a worker, a schedule and an
//! event. Applications embedding the library build their own
//! [`Artifacts`] instead.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_artifacts::{
    ConnectionHandler, Event, EventContext, Guard, Handler, HttpMiddleware, JobContext, Method,
    Reply, Route, RouteContext, Schedule, ScheduleContext, SocketContext, Worker,
};
use bootsmith_core::error::{EventError, HttpError, ServiceError, SocketError};
use bootsmith_loader::Artifacts;
use serde_json::{json, Value};
use tracing::{debug, info};

pub struct IndexRoute;

#[async_trait]
impl Route for IndexRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get, Method::Post]
    }

    fn middlewares(&self, _method: Method) -> Vec<String> {
        vec!["default".to_string()]
    }

    async fn get(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Ok(Reply::json(json!({ "test": "Hello World GET!" })))
    }

    async fn post(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Ok(Reply::json(json!({ "test": "Hello World POST!" })))
    }
}

pub struct DefaultMiddleware;

#[async_trait]
impl HttpMiddleware for DefaultMiddleware {
    async fn handle(&self, ctx: &mut RouteContext) -> Result<(), HttpError> {
        debug!("{}", ctx.request.path);
        Ok(())
    }
}

pub struct DefaultGuard;

#[async_trait]
impl Guard for DefaultGuard {
    async fn handle(&self, _ctx: &SocketContext) -> Result<(), SocketError> {
        Ok(())
    }
}

pub struct Connection;

#[async_trait]
impl ConnectionHandler for Connection {
    fn guards(&self) -> Vec<String> {
        vec!["default".to_string()]
    }

    async fn handle(&self, ctx: SocketContext) -> Result<(), SocketError> {
        info!("Socket {} connected", ctx.socket.id());
        Ok(())
    }
}

pub struct MessageHandler;

#[async_trait]
impl Handler for MessageHandler {
    fn guards(&self) -> Vec<String> {
        vec!["default".to_string()]
    }

    async fn handle(&self, ctx: SocketContext) -> Result<(), SocketError> {
        ctx.socket.emit("message", ctx.data).await
    }
}

pub struct ExampleWorker;

#[async_trait]
impl Worker for ExampleWorker {
    fn queue(&self) -> &str {
        "default"
    }

    async fn handle(&self, ctx: JobContext) -> Result<(), ServiceError> {
        info!("Processing job {}: {}", ctx.job.id, ctx.job.payload);
        Ok(())
    }
}

pub struct HeartbeatSchedule;

#[async_trait]
impl Schedule for HeartbeatSchedule {
    fn cron(&self) -> &str {
        // Top of every hour.
        "0 0 * * * *"
    }

    async fn handle(&self, _ctx: ScheduleContext) -> Result<(), ServiceError> {
        info!("Heartbeat");
        Ok(())
    }
}

pub struct PingEvent;

#[async_trait]
impl Event for PingEvent {
    async fn handle(&self, ctx: EventContext) -> Result<Value, EventError> {
        Ok(json!({ "pong": ctx.payload }))
    }
}

/// The default bundle.
pub fn artifacts() -> Artifacts {
    let mut artifacts = Artifacts::new();
    artifacts
        .route_file("index", Arc::new(IndexRoute))
        .middleware("default", Arc::new(DefaultMiddleware))
        .guard("default", Arc::new(DefaultGuard))
        .connection(Arc::new(Connection))
        .handler("message", Arc::new(MessageHandler))
        .worker("example", Arc::new(ExampleWorker))
        .schedule("heartbeat", Arc::new(HeartbeatSchedule))
        .event("ping", Arc::new(PingEvent));
    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bundle_contents() {
        let artifacts = artifacts();
        assert!(artifacts.routes.contains("/"));
        assert!(artifacts.middlewares.contains("default"));
        assert!(artifacts.handlers.contains("message"));
        assert!(artifacts.connection.is_some());
        assert_eq!(artifacts.workers.len(), 1);
        assert_eq!(artifacts.schedules.len(), 1);
        assert_eq!(artifacts.events.len(), 1);
    }
}
