//! Cron scheduler service.
//!
//! Each schedule artifact gets its own tokio task sleeping until the
//! next due time of its cron expression. Expressions are parsed at
//! boot; an invalid one aborts startup.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_artifacts::{Schedule, ScheduleContext};
use bootsmith_core::error::ServiceError;
use bootsmith_core::{BootContext, Container, Service};
use bootsmith_loader::Catalog;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "scheduler";

pub struct SchedulerService {
    schedules: Mutex<Option<Catalog<dyn Schedule>>>,
}

impl SchedulerService {
    pub fn new(schedules: Catalog<dyn Schedule>) -> Self {
        Self {
            schedules: Mutex::new(Some(schedules)),
        }
    }
}

async fn run_schedule(
    name: String,
    cron: cron::Schedule,
    schedule: Arc<dyn Schedule>,
    container: Arc<Container>,
) {
    loop {
        let Some(next) = cron.upcoming(Utc).next() else {
            warn!("Schedule {} has no upcoming runs, stopping", name);
            break;
        };
        let Ok(wait) = (next - Utc::now()).to_std() else {
            // Due time already passed while we were running; re-evaluate.
            continue;
        };
        tokio::time::sleep(wait).await;
        if let Err(e) = schedule
            .handle(ScheduleContext {
                container: container.clone(),
            })
            .await
        {
            warn!("Schedule {} failed: {}", name, e);
        }
    }
}

#[async_trait]
impl Service for SchedulerService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, ctx: &BootContext) -> Result<(), ServiceError> {
        let schedules = self
            .schedules
            .lock()
            .take()
            .ok_or_else(|| ServiceError::Config("Scheduler booted twice".to_string()))?;

        let mut count = 0;
        for (name, schedule) in schedules.iter() {
            let cron: cron::Schedule =
                schedule
                    .cron()
                    .parse()
                    .map_err(|e: cron::error::Error| ServiceError::InvalidCron {
                        name: name.to_string(),
                        message: e.to_string(),
                    })?;
            info!("Schedule {} registered ({})", name, schedule.cron());
            tokio::spawn(run_schedule(
                name.to_string(),
                cron,
                schedule.clone(),
                ctx.container.clone(),
            ));
            count += 1;
        }
        info!("Scheduler ready ({} schedules)", count);
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
