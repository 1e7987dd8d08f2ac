//! Event bus artifact contract.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::EventError;
use bootsmith_core::Container;
use serde_json::Value;

pub struct EventContext {
    pub container: Arc<Container>,
    pub payload: Value,
}

/// Handler for one named bus event. The event name is assigned at
/// registration time.
#[async_trait]
pub trait Event: Send + Sync + 'static {
    async fn handle(&self, ctx: EventContext) -> Result<Value, EventError>;
}
