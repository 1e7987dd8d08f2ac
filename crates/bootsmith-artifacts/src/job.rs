//! Queue job and worker contracts.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::ServiceError;
use bootsmith_core::Container;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// A unit of queued work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub queue: String,
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    pub fn new(queue: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: queue.into(),
            payload,
            enqueued_at: Utc::now(),
        }
    }
}

pub struct JobContext {
    pub container: Arc<Container>,
    pub job: Job,
}

/// Processes jobs from one named queue.
///
/// A worker naming a queue that is not configured is skipped with a
/// warning at boot.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// The queue this worker consumes.
    fn queue(&self) -> &str;

    async fn handle(&self, ctx: JobContext) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_carries_queue_and_payload() {
        let job = Job::new("mail", serde_json::json!({"to": "a@b.c"}));
        assert_eq!(job.queue, "mail");
        assert_eq!(job.payload["to"], "a@b.c");
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = Job::new("q", Value::Null);
        let b = Job::new("q", Value::Null);
        assert_ne!(a.id, b.id);
    }
}
