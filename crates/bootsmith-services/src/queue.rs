//! Job queue service.
//!
//! Named in-memory queues from configuration. Workers bind to a queue
//! by name; a worker naming an unconfigured queue is skipped with a
//! warning. One dispatch task per queue drains jobs through every bound
//! worker in registration order.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_artifacts::{Job, JobContext, Worker};
use bootsmith_core::error::{QueueError, ServiceError};
use bootsmith_core::{BootContext, Container, Service};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

pub const SERVICE_NAME: &str = "queues";

const QUEUE_DEPTH: usize = 1024;

/// Live counters for one queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: u64,
    pub processed: u64,
}

struct QueueState {
    tx: mpsc::Sender<Job>,
    pending: Arc<AtomicU64>,
    processed: Arc<AtomicU64>,
}

pub struct QueueService {
    names: Vec<String>,
    workers: Mutex<Option<Vec<Arc<dyn Worker>>>>,
    queues: DashMap<String, QueueState>,
}

impl QueueService {
    pub fn new(names: Vec<String>, workers: Vec<Arc<dyn Worker>>) -> Self {
        Self {
            names,
            workers: Mutex::new(Some(workers)),
            queues: DashMap::new(),
        }
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.names.clone()
    }

    pub fn stats(&self, queue: &str) -> Option<QueueStats> {
        self.queues.get(queue).map(|state| QueueStats {
            pending: state.pending.load(Ordering::SeqCst),
            processed: state.processed.load(Ordering::SeqCst),
        })
    }

    /// Enqueue a payload. Returns the job id.
    pub async fn add_job(&self, queue: &str, payload: Value) -> Result<Uuid, QueueError> {
        let (tx, pending) = {
            let state = self
                .queues
                .get(queue)
                .ok_or_else(|| QueueError::NotFound(queue.to_string()))?;
            (state.tx.clone(), state.pending.clone())
        };
        let job = Job::new(queue, payload);
        let id = job.id;
        pending.fetch_add(1, Ordering::SeqCst);
        tx.send(job).await.map_err(|_| {
            pending.fetch_sub(1, Ordering::SeqCst);
            QueueError::Closed(queue.to_string())
        })?;
        Ok(id)
    }
}

async fn drain_queue(
    name: String,
    mut rx: mpsc::Receiver<Job>,
    workers: Vec<Arc<dyn Worker>>,
    container: Arc<Container>,
    pending: Arc<AtomicU64>,
    processed: Arc<AtomicU64>,
) {
    while let Some(job) = rx.recv().await {
        for worker in &workers {
            let ctx = JobContext {
                container: container.clone(),
                job: job.clone(),
            };
            if let Err(e) = worker.handle(ctx).await {
                warn!("Queue {} job {} failed: {}", name, job.id, e);
            }
        }
        pending.fetch_sub(1, Ordering::SeqCst);
        processed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Service for QueueService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, ctx: &BootContext) -> Result<(), ServiceError> {
        let workers = self
            .workers
            .lock()
            .take()
            .ok_or_else(|| ServiceError::Config("Queue service booted twice".to_string()))?;

        let mut bound: HashMap<&str, Vec<Arc<dyn Worker>>> = self
            .names
            .iter()
            .map(|name| (name.as_str(), Vec::new()))
            .collect();
        for worker in workers {
            match bound.get_mut(worker.queue()) {
                Some(list) => list.push(worker),
                None => warn!(
                    "Worker bound to unconfigured queue {}, skipping",
                    worker.queue()
                ),
            }
        }

        for name in &self.names {
            let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
            let pending = Arc::new(AtomicU64::new(0));
            let processed = Arc::new(AtomicU64::new(0));
            let workers = bound.remove(name.as_str()).unwrap_or_default();
            info!("Queue {} ready ({} workers)", name, workers.len());

            self.queues.insert(
                name.clone(),
                QueueState {
                    tx,
                    pending: pending.clone(),
                    processed: processed.clone(),
                },
            );
            tokio::spawn(drain_queue(
                name.clone(),
                rx,
                workers,
                ctx.container.clone(),
                pending,
                processed,
            ));
        }
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    struct RecordingWorker {
        queue: &'static str,
        seen: Arc<Mutex<Vec<Value>>>,
    }

    #[async_trait]
    impl Worker for RecordingWorker {
        fn queue(&self) -> &str {
            self.queue
        }

        async fn handle(&self, ctx: JobContext) -> Result<(), ServiceError> {
            self.seen.lock().push(ctx.job.payload.clone());
            Ok(())
        }
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !done() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    async fn booted(names: Vec<&str>, workers: Vec<Arc<dyn Worker>>) -> QueueService {
        let service = QueueService::new(names.into_iter().map(String::from).collect(), workers);
        let container = Container::new();
        container.compile();
        service.boot(&BootContext::new(container, None)).await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_job_reaches_bound_worker() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let worker = Arc::new(RecordingWorker {
            queue: "mail",
            seen: seen.clone(),
        });
        let service = booted(vec!["mail"], vec![worker]).await;

        service.add_job("mail", json!({"to": "a@b.c"})).await.unwrap();
        wait_until(|| service.stats("mail").is_some_and(|s| s.processed == 1)).await;
        assert_eq!(seen.lock().as_slice(), &[json!({"to": "a@b.c"})]);
        assert_eq!(
            service.stats("mail"),
            Some(QueueStats {
                pending: 0,
                processed: 1
            })
        );
    }

    #[tokio::test]
    async fn test_all_bound_workers_see_each_job() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let workers: Vec<Arc<dyn Worker>> = (0..2)
            .map(|_| {
                Arc::new(RecordingWorker {
                    queue: "fanout",
                    seen: seen.clone(),
                }) as Arc<dyn Worker>
            })
            .collect();
        let service = booted(vec!["fanout"], workers).await;

        service.add_job("fanout", json!(1)).await.unwrap();
        wait_until(|| seen.lock().len() == 2).await;
    }

    #[tokio::test]
    async fn test_unknown_queue_is_not_found() {
        let service = booted(vec!["mail"], Vec::new()).await;
        let result = service.add_job("ghost", Value::Null).await;
        assert!(matches!(result, Err(QueueError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_worker_for_unconfigured_queue_is_skipped() {
        let worker = Arc::new(RecordingWorker {
            queue: "nope",
            seen: Arc::new(Mutex::new(Vec::new())),
        });
        // Boot succeeds; the stray worker is simply not bound.
        let service = booted(vec!["mail"], vec![worker]).await;
        assert_eq!(service.queue_names(), vec!["mail"]);
    }
}
