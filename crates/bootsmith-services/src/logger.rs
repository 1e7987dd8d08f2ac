//! Logging service.
//!
//! First service to boot: installs the global tracing subscriber with a
//! console layer and a daily rolling file appender in the configured log
//! directory. `RUST_LOG` overrides the configured level when set.

use std::any::Any;
use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::ServiceError;
use bootsmith_core::{BootContext, Service};
use parking_lot::Mutex;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const SERVICE_NAME: &str = "logger";

pub struct LoggerService {
    directory: String,
    debug: bool,
    // Dropping the guard stops the background writer; keep it alive for
    // the service's lifetime.
    guard: Mutex<Option<WorkerGuard>>,
}

impl LoggerService {
    pub fn new(directory: impl Into<String>, debug: bool) -> Self {
        Self {
            directory: directory.into(),
            debug,
            guard: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Service for LoggerService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        fs::create_dir_all(&self.directory)?;

        let appender = tracing_appender::rolling::daily(&self.directory, "bootsmith.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let default_level = if self.debug { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        // try_init: repeated boots in one process (tests) keep the first
        // subscriber instead of failing.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .try_init();
        *self.guard.lock() = Some(guard);

        info!("Logger ready, writing to {}", self.directory);
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootsmith_core::Container;

    #[tokio::test]
    async fn test_boot_creates_log_directory_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let service = LoggerService::new(logs.to_string_lossy(), false);

        let container = Container::new();
        container.compile();
        let ctx = BootContext::new(container, None);

        service.boot(&ctx).await.unwrap();
        assert!(logs.is_dir());
        // A second boot must not fail on the already-set subscriber.
        service.boot(&ctx).await.unwrap();
    }
}
