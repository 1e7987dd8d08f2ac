//! Queue dashboard extension.
//!
//! Registers read-only endpoints listing the configured queues and
//! their job counters. Loaded after boot; when the queue or HTTP
//! service is absent it warns and does nothing.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_artifacts::{Method, Reply, Route, RouteContext};
use bootsmith_core::error::{ExtensionError, HttpError};
use bootsmith_core::{Container, Extension};
use bootsmith_http::HttpService;
use bootsmith_services::QueueService;
use serde_json::json;
use tracing::{info, warn};

pub const EXTENSION_NAME: &str = "queue-dashboard";

pub struct QueueDashboard {
    path: String,
}

impl QueueDashboard {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for QueueDashboard {
    fn default() -> Self {
        Self::new("/queues")
    }
}

#[async_trait]
impl Extension for QueueDashboard {
    fn name(&self) -> &str {
        EXTENSION_NAME
    }

    async fn load(&self, container: &Arc<Container>) -> Result<(), ExtensionError> {
        if !container.has(bootsmith_services::queue::SERVICE_NAME)
            || !container.has(bootsmith_http::SERVICE_NAME)
        {
            warn!("Queue dashboard needs the queues and http services, skipping");
            return Ok(());
        }
        let queues = container.get_as::<QueueService>(bootsmith_services::queue::SERVICE_NAME)?;
        let http = container.get_as::<HttpService>(bootsmith_http::SERVICE_NAME)?;

        http.register_routes(vec![
            (
                self.path.clone(),
                Arc::new(OverviewRoute {
                    queues: queues.clone(),
                }) as Arc<dyn Route>,
            ),
            (
                format!("{}/{{name}}", self.path),
                Arc::new(DetailRoute { queues }) as Arc<dyn Route>,
            ),
        ]);
        info!("Queue dashboard mounted at {}", self.path);
        Ok(())
    }
}

struct OverviewRoute {
    queues: Arc<QueueService>,
}

#[async_trait]
impl Route for OverviewRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get]
    }

    async fn get(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        let queues: Vec<_> = self
            .queues
            .queue_names()
            .into_iter()
            .map(|name| {
                let stats = self.queues.stats(&name).unwrap_or_default();
                json!({
                    "name": name,
                    "pending": stats.pending,
                    "processed": stats.processed,
                })
            })
            .collect();
        Ok(Reply::json(json!({ "queues": queues })))
    }
}

struct DetailRoute {
    queues: Arc<QueueService>,
}

#[async_trait]
impl Route for DetailRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get]
    }

    async fn get(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let name = ctx
            .request
            .params
            .get("name")
            .ok_or_else(|| HttpError::bad_request("Missing queue name"))?;
        let stats = self
            .queues
            .stats(name)
            .ok_or_else(|| HttpError::not_found(format!("Queue not found: {name}")))?;
        Ok(Reply::json(json!({
            "name": name,
            "pending": stats.pending,
            "processed": stats.processed,
        })))
    }
}
