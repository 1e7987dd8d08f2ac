//! Object storage service.
//!
//! Bucketed object store over a filesystem root. Object keys may
//! contain `/` separators; every path component is validated, so keys
//! can never escape the storage root.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::{ServiceError, StorageError};
use bootsmith_core::{BootContext, Service};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::info;

pub const SERVICE_NAME: &str = "storage";

#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn validate_component(part: &str, original: &str) -> Result<(), StorageError> {
        if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
            return Err(StorageError::InvalidPath(original.to_string()));
        }
        Ok(())
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        Self::validate_component(bucket, bucket)?;
        if bucket.contains('/') {
            return Err(StorageError::InvalidPath(bucket.to_string()));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.bucket_path(bucket)?;
        if key.is_empty() {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        for part in key.split('/') {
            Self::validate_component(part, key)?;
            path.push(part);
        }
        Ok(path)
    }

    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.bucket_path(bucket)?).await?;
        Ok(())
    }

    /// Create an empty key prefix (folder) inside a bucket.
    pub async fn create_prefix(&self, bucket: &str, prefix: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.object_path(bucket, prefix)?).await?;
        Ok(())
    }

    /// Remove a key prefix and every object under it.
    pub async fn remove_prefix(&self, bucket: &str, prefix: &str) -> Result<(), StorageError> {
        let path = self.object_path(bucket, prefix)?;
        match fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(self.missing(bucket, prefix).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Store an object, creating the bucket and any key prefixes.
    pub async fn save(
        &self,
        bucket: &str,
        key: &str,
        bytes: impl Into<Bytes>,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, bytes.into()).await?;
        Ok(())
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(self.missing(bucket, key).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn info(&self, bucket: &str, key: &str) -> Result<ObjectInfo, StorageError> {
        let path = self.object_path(bucket, key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(ObjectInfo {
                key: key.to_string(),
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::from),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(self.missing(bucket, key).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(self.missing(bucket, key).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Keys in a bucket, sorted, optionally filtered by prefix.
    pub async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, StorageError> {
        let base = self.bucket_path(bucket)?;
        if !base.is_dir() {
            return Err(StorageError::BucketNotFound(bucket.to_string()));
        }

        let mut keys = Vec::new();
        let mut stack = vec![base.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Some(key) = relative_key(&base, &path) {
                    if prefix.is_none_or(|p| key.starts_with(p)) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn missing(&self, bucket: &str, key: &str) -> StorageError {
        match self.bucket_path(bucket) {
            Ok(path) if path.is_dir() => StorageError::ObjectNotFound(key.to_string()),
            _ => StorageError::BucketNotFound(bucket.to_string()),
        }
    }
}

fn relative_key(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    Some(parts.join("/"))
}

#[async_trait]
impl Service for StorageService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        std::fs::create_dir_all(&self.root).map_err(StorageError::from)?;
        info!("Storage ready at {}", self.root.display());
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
