//! Storage browser extension.
//!
//! Upload, browse, download, inspect and delete objects in one bucket
//! of the storage service, all over HTTP, plus create and delete of
//! whole folder prefixes. Loaded after boot; when the storage or HTTP
//! service is absent it warns and does nothing.
//!
//! Uploads are JSON `{ "key": ..., "content": ... }` bodies bounded by
//! `max_upload`; downloads come back as binary attachments.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_artifacts::{Method, Reply, Route, RouteContext};
use bootsmith_core::error::{ExtensionError, HttpError, StorageError};
use bootsmith_core::{Container, Extension};
use bootsmith_http::HttpService;
use bootsmith_services::StorageService;
use serde_json::json;
use tracing::{info, warn};

pub const EXTENSION_NAME: &str = "storage-browser";

pub struct StorageBrowser {
    path: String,
    bucket: String,
    max_upload: usize,
}

impl StorageBrowser {
    pub fn new(path: impl Into<String>, bucket: impl Into<String>, max_upload: usize) -> Self {
        Self {
            path: path.into(),
            bucket: bucket.into(),
            max_upload,
        }
    }
}

impl Default for StorageBrowser {
    fn default() -> Self {
        Self::new("/storage", "uploads", 10 * 1024 * 1024)
    }
}

#[async_trait]
impl Extension for StorageBrowser {
    fn name(&self) -> &str {
        EXTENSION_NAME
    }

    async fn load(&self, container: &Arc<Container>) -> Result<(), ExtensionError> {
        if !container.has(bootsmith_services::storage::SERVICE_NAME)
            || !container.has(bootsmith_http::SERVICE_NAME)
        {
            warn!("Storage browser needs the storage and http services, skipping");
            return Ok(());
        }
        let storage =
            container.get_as::<StorageService>(bootsmith_services::storage::SERVICE_NAME)?;
        let http = container.get_as::<HttpService>(bootsmith_http::SERVICE_NAME)?;

        storage
            .ensure_bucket(&self.bucket)
            .await
            .map_err(|e| ExtensionError::Custom(e.to_string()))?;

        let shared = Arc::new(BrowserState {
            storage,
            bucket: self.bucket.clone(),
            max_upload: self.max_upload,
        });
        http.register_routes(vec![
            (
                self.path.clone(),
                Arc::new(BrowseRoute(shared.clone())) as Arc<dyn Route>,
            ),
            (
                format!("{}/upload", self.path),
                Arc::new(UploadRoute(shared.clone())) as Arc<dyn Route>,
            ),
            (
                format!("{}/download/{{*key}}", self.path),
                Arc::new(DownloadRoute(shared.clone())) as Arc<dyn Route>,
            ),
            (
                format!("{}/info/{{*key}}", self.path),
                Arc::new(InfoRoute(shared.clone())) as Arc<dyn Route>,
            ),
            (
                format!("{}/object/{{*key}}", self.path),
                Arc::new(DeleteRoute(shared.clone())) as Arc<dyn Route>,
            ),
            (
                format!("{}/folder", self.path),
                Arc::new(CreateFolderRoute(shared.clone())) as Arc<dyn Route>,
            ),
            (
                format!("{}/folder/{{*key}}", self.path),
                Arc::new(DeleteFolderRoute(shared)) as Arc<dyn Route>,
            ),
        ]);
        info!(
            "Storage browser mounted at {} (bucket {})",
            self.path, self.bucket
        );
        Ok(())
    }
}

struct BrowserState {
    storage: Arc<StorageService>,
    bucket: String,
    max_upload: usize,
}

fn storage_error(e: StorageError) -> HttpError {
    match e {
        StorageError::BucketNotFound(_) | StorageError::ObjectNotFound(_) => {
            HttpError::not_found(e.to_string())
        }
        StorageError::InvalidPath(_) => HttpError::bad_request(e.to_string()),
        StorageError::Io(_) => HttpError::internal(e.to_string()),
    }
}

fn key_param(ctx: &RouteContext) -> Result<String, HttpError> {
    ctx.request
        .params
        .get("key")
        .cloned()
        .ok_or_else(|| HttpError::bad_request("Missing object key"))
}

struct BrowseRoute(Arc<BrowserState>);

#[async_trait]
impl Route for BrowseRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get]
    }

    async fn get(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let prefix = ctx.request.query.get("prefix").map(String::as_str);
        let keys = self
            .0
            .storage
            .list(&self.0.bucket, prefix)
            .await
            .map_err(storage_error)?;
        Ok(Reply::json(json!({ "bucket": self.0.bucket, "objects": keys })))
    }
}

struct UploadRoute(Arc<BrowserState>);

#[async_trait]
impl Route for UploadRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Post]
    }

    async fn post(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let key = ctx.request.body["key"]
            .as_str()
            .ok_or_else(|| HttpError::bad_request("Missing key field"))?
            .to_string();
        let content = ctx.request.body["content"]
            .as_str()
            .ok_or_else(|| HttpError::bad_request("Missing content field"))?;
        if content.len() > self.0.max_upload {
            return Err(HttpError::Status {
                status: 413,
                message: format!("Upload exceeds {} bytes", self.0.max_upload),
            });
        }

        self.0
            .storage
            .save(&self.0.bucket, &key, content.as_bytes().to_vec())
            .await
            .map_err(storage_error)?;
        Ok(Reply::json(json!({ "key": key, "size": content.len() })))
    }
}

struct DownloadRoute(Arc<BrowserState>);

#[async_trait]
impl Route for DownloadRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get]
    }

    async fn get(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let key = key_param(&ctx)?;
        let bytes = self
            .0
            .storage
            .get(&self.0.bucket, &key)
            .await
            .map_err(storage_error)?;
        let filename = key.rsplit('/').next().unwrap_or(&key).to_string();
        Ok(Reply::attachment(filename, "application/octet-stream", bytes))
    }
}

struct InfoRoute(Arc<BrowserState>);

#[async_trait]
impl Route for InfoRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get]
    }

    async fn get(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let key = key_param(&ctx)?;
        let info = self
            .0
            .storage
            .info(&self.0.bucket, &key)
            .await
            .map_err(storage_error)?;
        Ok(Reply::json(json!({
            "key": info.key,
            "size": info.size,
            "modified": info.modified,
        })))
    }
}

struct DeleteRoute(Arc<BrowserState>);

#[async_trait]
impl Route for DeleteRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Delete]
    }

    async fn delete(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let key = key_param(&ctx)?;
        self.0
            .storage
            .remove(&self.0.bucket, &key)
            .await
            .map_err(storage_error)?;
        Ok(Reply::json(json!({ "deleted": key })))
    }
}

struct CreateFolderRoute(Arc<BrowserState>);

#[async_trait]
impl Route for CreateFolderRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Post]
    }

    async fn post(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let prefix = ctx.request.body["prefix"]
            .as_str()
            .ok_or_else(|| HttpError::bad_request("Missing prefix field"))?
            .to_string();
        self.0
            .storage
            .create_prefix(&self.0.bucket, &prefix)
            .await
            .map_err(storage_error)?;
        Ok(Reply::json(json!({ "created": prefix })))
    }
}

struct DeleteFolderRoute(Arc<BrowserState>);

#[async_trait]
impl Route for DeleteFolderRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Delete]
    }

    async fn delete(&self, ctx: RouteContext) -> Result<Reply, HttpError> {
        let prefix = key_param(&ctx)?;
        self.0
            .storage
            .remove_prefix(&self.0.bucket, &prefix)
            .await
            .map_err(storage_error)?;
        Ok(Reply::json(json!({ "deleted": prefix })))
    }
}

#[cfg(test)]
mod tests {
    use bootsmith_artifacts::RequestParts;
    use serde_json::Value;

    use super::*;

    fn state(max_upload: usize) -> (Arc<BrowserState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(BrowserState {
            storage: Arc::new(StorageService::new(dir.path())),
            bucket: "uploads".to_string(),
            max_upload,
        });
        (state, dir)
    }

    fn ctx(body: Value, params: &[(&str, &str)]) -> RouteContext {
        let container = Container::new();
        container.compile();
        let mut request = RequestParts::default();
        request.body = body;
        for (k, v) in params {
            request.params.insert(k.to_string(), v.to_string());
        }
        RouteContext { container, request }
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let (state, _dir) = state(1024);
        let upload = UploadRoute(state.clone());
        let download = DownloadRoute(state);

        upload
            .post(ctx(json!({"key": "notes.txt", "content": "hello"}), &[]))
            .await
            .unwrap();

        let reply = download
            .get(ctx(Value::Null, &[("key", "notes.txt")]))
            .await
            .unwrap();
        let Reply::Binary {
            filename, bytes, ..
        } = reply
        else {
            panic!("expected binary reply");
        };
        assert_eq!(filename, "notes.txt");
        assert_eq!(bytes.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_413() {
        let (state, _dir) = state(4);
        let upload = UploadRoute(state);

        let result = upload
            .post(ctx(json!({"key": "big.txt", "content": "too large"}), &[]))
            .await;
        assert!(matches!(result, Err(HttpError::Status { status: 413, .. })));
    }

    #[tokio::test]
    async fn test_browse_lists_uploaded_objects() {
        let (state, _dir) = state(1024);
        UploadRoute(state.clone())
            .post(ctx(json!({"key": "a.txt", "content": "x"}), &[]))
            .await
            .unwrap();

        let reply = BrowseRoute(state).get(ctx(Value::Null, &[])).await.unwrap();
        let Reply::Json(body) = reply else {
            panic!("expected json reply");
        };
        assert_eq!(body["objects"], json!(["a.txt"]));
    }

    #[tokio::test]
    async fn test_download_missing_object_is_404() {
        let (state, _dir) = state(1024);
        state.storage.ensure_bucket("uploads").await.unwrap();

        let result = DownloadRoute(state)
            .get(ctx(Value::Null, &[("key", "ghost")]))
            .await;
        assert!(matches!(result, Err(HttpError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let (state, _dir) = state(1024);
        UploadRoute(state.clone())
            .post(ctx(json!({"key": "gone.txt", "content": "x"}), &[]))
            .await
            .unwrap();

        DeleteRoute(state.clone())
            .delete(ctx(Value::Null, &[("key", "gone.txt")]))
            .await
            .unwrap();
        let result = InfoRoute(state)
            .get(ctx(Value::Null, &[("key", "gone.txt")]))
            .await;
        assert!(matches!(result, Err(HttpError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_folder_create_and_delete() {
        let (state, dir) = state(1024);
        CreateFolderRoute(state.clone())
            .post(ctx(json!({"prefix": "reports/2026"}), &[]))
            .await
            .unwrap();
        assert!(dir.path().join("uploads/reports/2026").is_dir());

        UploadRoute(state.clone())
            .post(ctx(json!({"key": "reports/2026/q1.txt", "content": "x"}), &[]))
            .await
            .unwrap();
        DeleteFolderRoute(state.clone())
            .delete(ctx(Value::Null, &[("key", "reports")]))
            .await
            .unwrap();

        let reply = BrowseRoute(state).get(ctx(Value::Null, &[])).await.unwrap();
        let Reply::Json(body) = reply else {
            panic!("expected json reply");
        };
        assert_eq!(body["objects"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_missing_folder_is_404() {
        let (state, _dir) = state(1024);
        state.storage.ensure_bucket("uploads").await.unwrap();

        let result = DeleteFolderRoute(state)
            .delete(ctx(Value::Null, &[("key", "ghost")]))
            .await;
        assert!(matches!(result, Err(HttpError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_traversal_key_is_400() {
        let (state, _dir) = state(1024);
        let result = UploadRoute(state)
            .post(ctx(json!({"key": "../escape", "content": "x"}), &[]))
            .await;
        assert!(matches!(result, Err(HttpError::Status { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_load_skips_when_services_absent() {
        let container = Container::new();
        container.compile();
        StorageBrowser::default().load(&container).await.unwrap();
    }
}
