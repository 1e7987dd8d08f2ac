//! Socket artifact contracts and per-connection plumbing.

use std::sync::Arc;

use async_trait::async_trait;
use bootsmith_core::error::SocketError;
use bootsmith_core::Container;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Wire frame: every socket message is `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl SocketFrame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Error-shaped frame emitted back to the peer.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            event: "error".to_string(),
            data: serde_json::json!({ "success": false, "message": message.into() }),
        }
    }
}

/// Handle to one connected peer. Cloneable; emitting is fire-and-forget
/// into the connection's outbound queue.
#[derive(Clone)]
pub struct SocketHandle {
    id: String,
    tx: mpsc::Sender<SocketFrame>,
}

impl SocketHandle {
    pub fn new(id: impl Into<String>, tx: mpsc::Sender<SocketFrame>) -> Self {
        Self { id: id.into(), tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Emit a frame to this peer.
    pub async fn emit(&self, event: impl Into<String>, data: Value) -> Result<(), SocketError> {
        self.tx
            .send(SocketFrame::new(event, data))
            .await
            .map_err(|_| SocketError::ConnectionClosed)
    }
}

/// Connection manager shared with every guard and handler, used for
/// broadcasts and peer lookups.
#[derive(Default)]
pub struct SocketHub {
    connections: DashMap<String, SocketHandle>,
}

impl SocketHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: SocketHandle) {
        self.connections.insert(handle.id().to_string(), handle);
    }

    pub fn remove(&self, id: &str) {
        self.connections.remove(id);
    }

    pub fn get(&self, id: &str) -> Option<SocketHandle> {
        self.connections.get(id).map(|h| h.clone())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Emit a frame to every connected peer. Closed connections are
    /// skipped; they are reaped when their receive loop ends.
    pub async fn broadcast(&self, event: &str, data: Value) {
        let handles: Vec<SocketHandle> =
            self.connections.iter().map(|h| h.value().clone()).collect();
        for handle in handles {
            if handle.emit(event, data.clone()).await.is_err() {
                debug!("Skipping closed connection {}", handle.id());
            }
        }
    }
}

/// Context passed to socket guards and handlers.
pub struct SocketContext {
    pub container: Arc<Container>,
    pub socket: SocketHandle,
    pub data: Value,
    pub hub: Arc<SocketHub>,
}

/// A connection- or event-level access check.
///
/// A rejecting guard is a collaborator-defined outcome: the dispatch
/// layer logs it and stops processing the event; emitting an error
/// payload back to the peer is the guard's own responsibility.
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn handle(&self, ctx: &SocketContext) -> Result<(), SocketError>;
}

/// Handler for one named socket event.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Guard names run before `handle`. Missing names are skipped with
    /// a warning, never fatal.
    fn guards(&self) -> Vec<String> {
        Vec::new()
    }

    async fn handle(&self, ctx: SocketContext) -> Result<(), SocketError>;
}

/// The mandatory per-connection handler, invoked once per new peer
/// before any event dispatch is wired up.
#[async_trait]
pub trait ConnectionHandler: Send + Sync + 'static {
    fn guards(&self) -> Vec<String> {
        Vec::new()
    }

    async fn handle(&self, ctx: SocketContext) -> Result<(), SocketError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_roundtrip() {
        let frame = SocketFrame::new("message", serde_json::json!({"text": "hi"}));
        let json = serde_json::to_string(&frame).unwrap();
        let parsed: SocketFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event, "message");
        assert_eq!(parsed.data["text"], "hi");
    }

    #[test]
    fn test_frame_data_defaults_to_null() {
        let parsed: SocketFrame = serde_json::from_str(r#"{"event":"ping"}"#).unwrap();
        assert!(parsed.data.is_null());
    }

    #[test]
    fn test_error_frame_shape() {
        let frame = SocketFrame::error("bad payload");
        assert_eq!(frame.event, "error");
        assert_eq!(frame.data["success"], false);
        assert_eq!(frame.data["message"], "bad payload");
    }

    #[tokio::test]
    async fn test_hub_broadcast_reaches_all_peers() {
        let hub = SocketHub::new();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        hub.insert(SocketHandle::new("a", tx1));
        hub.insert(SocketHandle::new("b", tx2));

        hub.broadcast("tick", serde_json::json!(1)).await;
        assert_eq!(rx1.recv().await.unwrap().event, "tick");
        assert_eq!(rx2.recv().await.unwrap().event, "tick");
    }

    #[tokio::test]
    async fn test_emit_to_closed_connection_errors() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = SocketHandle::new("gone", tx);
        let result = handle.emit("ping", Value::Null).await;
        assert!(matches!(result, Err(SocketError::ConnectionClosed)));
    }
}
