//! Event bus service.
//!
//! Named events dispatch to their registered handler. `emit` awaits the
//! handler inline; `emit_async` races a spawned handler against a
//! timeout. A timed-out handler is abandoned, never aborted: it keeps
//! running to completion on its own task.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bootsmith_artifacts::{Event, EventContext};
use bootsmith_core::error::{EventError, ServiceError};
use bootsmith_core::{BootContext, Container, Service};
use bootsmith_loader::Catalog;
use once_cell::sync::OnceCell;
use tracing::info;

pub const SERVICE_NAME: &str = "events";

pub struct EventService {
    events: Catalog<dyn Event>,
    default_timeout_ms: u64,
    container: OnceCell<Arc<Container>>,
}

impl EventService {
    pub fn new(events: Catalog<dyn Event>, default_timeout_ms: u64) -> Self {
        Self {
            events,
            default_timeout_ms,
            container: OnceCell::new(),
        }
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.names()
    }

    fn resolve(
        &self,
        name: &str,
    ) -> Result<(Arc<dyn Event>, Arc<Container>), EventError> {
        let handler = self
            .events
            .get(name)
            .ok_or_else(|| EventError::NotFound(name.to_string()))?;
        let container = self
            .container
            .get()
            .cloned()
            .ok_or_else(|| EventError::Handler("event bus is not booted".to_string()))?;
        Ok((handler, container))
    }

    /// Emit an event and await its handler.
    pub async fn emit(
        &self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, EventError> {
        let (handler, container) = self.resolve(name)?;
        handler.handle(EventContext { container, payload }).await
    }

    /// Emit an event on a spawned task, waiting at most `timeout_ms`
    /// (the configured default when `None`) for the result.
    pub async fn emit_async(
        &self,
        name: &str,
        payload: serde_json::Value,
        timeout_ms: Option<u64>,
    ) -> Result<serde_json::Value, EventError> {
        let timeout_ms = timeout_ms.unwrap_or(self.default_timeout_ms);
        let (handler, container) = self.resolve(name)?;

        let task =
            tokio::spawn(async move { handler.handle(EventContext { container, payload }).await });
        match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(EventError::Handler(join.to_string())),
            // Timing out drops the JoinHandle only; the handler task
            // runs on.
            Err(_) => Err(EventError::Timeout {
                name: name.to_string(),
                timeout_ms,
            }),
        }
    }
}

#[async_trait]
impl Service for EventService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, ctx: &BootContext) -> Result<(), ServiceError> {
        if self.container.set(ctx.container.clone()).is_err() {
            return Err(ServiceError::Config("Event bus booted twice".to_string()));
        }
        info!("Event bus ready ({} events)", self.events.len());
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
