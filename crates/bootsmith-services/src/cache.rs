//! Cache service.
//!
//! In-process TTL key/value store with a narrow async interface.
//! Expired entries are dropped lazily on access.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bootsmith_core::error::ServiceError;
use bootsmith_core::{BootContext, Service};
use dashmap::DashMap;
use serde_json::Value;
use tracing::info;

pub const SERVICE_NAME: &str = "cache";

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

pub struct CacheService {
    url: String,
    entries: DashMap<String, Entry>,
}

impl CacheService {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            entries: DashMap::new(),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let hit = self.entries.get(key).map(|e| (e.expired(), e.value.clone()));
        match hit {
            Some((false, value)) => Some(value),
            Some((true, _)) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remove a key; true when it was present and live.
    pub async fn del(&self, key: &str) -> bool {
        self.entries
            .remove(key)
            .map(|(_, entry)| !entry.expired())
            .unwrap_or(false)
    }

    /// Live keys, in no particular order.
    pub async fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.expired())
            .map(|e| e.key().clone())
            .collect()
    }

    /// Reset the TTL of an existing live key; true when it applied.
    pub async fn expire(&self, key: &str, ttl: Duration) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl Service for CacheService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        info!("Cache ready ({})", self.url);
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cache() -> CacheService {
        CacheService::new("memory://")
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = cache();
        cache.set("user:1", json!({"name": "ada"}), None).await;
        assert_eq!(cache.get("user:1").await, Some(json!({"name": "ada"})));
        assert_eq!(cache.get("user:2").await, None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = cache();
        cache
            .set("flash", json!(1), Some(Duration::from_millis(10)))
            .await;
        assert!(cache.get("flash").await.is_some());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("flash").await, None);
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_del() {
        let cache = cache();
        cache.set("k", json!(true), None).await;
        assert!(cache.del("k").await);
        assert!(!cache.del("k").await);
    }

    #[tokio::test]
    async fn test_expire_extends_and_rejects_missing() {
        let cache = cache();
        cache.set("k", json!(1), Some(Duration::from_millis(10))).await;
        assert!(cache.expire("k", Duration::from_secs(60)).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Still alive thanks to the extended TTL.
        assert!(cache.get("k").await.is_some());
        assert!(!cache.expire("missing", Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_keys_lists_live_entries() {
        let cache = cache();
        cache.set("a", json!(1), None).await;
        cache.set("b", json!(2), None).await;
        let mut keys = cache.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
