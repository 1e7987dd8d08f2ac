//! Database service.
//!
//! Narrow async SQL interface over an embedded SQLite connection. The
//! configured URL is `sqlite://<path>` (or `sqlite://:memory:`); the
//! file and its parent directories are created on first boot.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::{DatabaseError, ServiceError};
use bootsmith_core::{BootContext, Service};
use once_cell::sync::OnceCell;
use rusqlite::types::ValueRef;
use serde_json::Value;
use tokio_rusqlite::Connection;
use tracing::info;

pub const SERVICE_NAME: &str = "database";

pub struct DatabaseService {
    url: String,
    app_root: PathBuf,
    connection: OnceCell<Connection>,
}

impl DatabaseService {
    pub fn new(url: impl Into<String>, app_root: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            app_root: app_root.into(),
            connection: OnceCell::new(),
        }
    }

    fn sqlite_path(url: &str) -> &str {
        url.strip_prefix("sqlite://").unwrap_or(url)
    }

    fn connection(&self) -> Result<&Connection, DatabaseError> {
        self.connection
            .get()
            .ok_or_else(|| DatabaseError::Connection("database is not booted".to_string()))
    }

    /// Run a statement; returns the affected row count.
    pub async fn execute(&self, sql: impl Into<String>) -> Result<usize, DatabaseError> {
        let sql = sql.into();
        self.connection()?
            .call(move |conn| Ok(conn.execute(&sql, [])?))
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Run a query; rows come back as JSON objects keyed by column name.
    pub async fn query_json(&self, sql: impl Into<String>) -> Result<Vec<Value>, DatabaseError> {
        let sql = sql.into();
        self.connection()?
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> =
                    stmt.column_names().iter().map(|c| c.to_string()).collect();
                let mut rows = stmt.query([])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut object = serde_json::Map::new();
                    for (i, column) in columns.iter().enumerate() {
                        let value = match row.get_ref(i)? {
                            ValueRef::Null => Value::Null,
                            ValueRef::Integer(v) => Value::from(v),
                            ValueRef::Real(v) => Value::from(v),
                            ValueRef::Text(v) => {
                                Value::String(String::from_utf8_lossy(v).into_owned())
                            }
                            ValueRef::Blob(v) => {
                                Value::Array(v.iter().map(|b| Value::from(*b)).collect())
                            }
                        };
                        object.insert(column.clone(), value);
                    }
                    out.push(Value::Object(object));
                }
                Ok(out)
            })
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }
}

#[async_trait]
impl Service for DatabaseService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        // Model files live under the convention tree next to the other
        // artifact directories.
        std::fs::create_dir_all(self.app_root.join("models"))?;

        let path = Self::sqlite_path(&self.url).to_string();
        let connection = if path == ":memory:" {
            Connection::open_in_memory().await
        } else {
            if let Some(parent) = PathBuf::from(&path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path).await
        }
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        if self.connection.set(connection).is_err() {
            return Err(ServiceError::Config("Database booted twice".to_string()));
        }
        info!("Database connected ({})", self.url);
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use bootsmith_core::Container;
    use serde_json::json;

    use super::*;

    async fn booted() -> (DatabaseService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let service = DatabaseService::new("sqlite://:memory:", dir.path());
        let container = Container::new();
        container.compile();
        service.boot(&BootContext::new(container, None)).await.unwrap();
        (service, dir)
    }

    #[tokio::test]
    async fn test_execute_and_query_roundtrip() {
        let (db, _dir) = booted().await;
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();
        db.execute("INSERT INTO users (name) VALUES ('ada'), ('grace')")
            .await
            .unwrap();

        let rows = db
            .query_json("SELECT id, name FROM users ORDER BY id")
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                json!({"id": 1, "name": "ada"}),
                json!({"id": 2, "name": "grace"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_sql_is_query_error() {
        let (db, _dir) = booted().await;
        let result = db.execute("NOT A STATEMENT").await;
        assert!(matches!(result, Err(DatabaseError::Query(_))));
    }

    #[tokio::test]
    async fn test_boot_creates_models_dir() {
        let (_db, dir) = booted().await;
        assert!(dir.path().join("models").is_dir());
    }

    #[test]
    fn test_sqlite_path_parsing() {
        assert_eq!(DatabaseService::sqlite_path("sqlite:///tmp/db.sqlite"), "/tmp/db.sqlite");
        assert_eq!(DatabaseService::sqlite_path(":memory:"), ":memory:");
    }
}
