//! Timed job contract.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::ServiceError;
use bootsmith_core::Container;

pub struct ScheduleContext {
    pub container: Arc<Container>,
}

/// A cron-timed job. The expression is parsed at boot; an invalid
/// expression is a fatal boot error.
#[async_trait]
pub trait Schedule: Send + Sync + 'static {
    /// Cron expression (seconds-resolution, `sec min hour dom mon dow`).
    fn cron(&self) -> &str;

    async fn handle(&self, ctx: ScheduleContext) -> Result<(), ServiceError>;
}
