//! Per-connection session loop and frame dispatch.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use bootsmith_artifacts::{
    ConnectionHandler, Guard, Handler, SocketFrame, SocketHandle, SocketHub, SocketContext,
};
use bootsmith_core::Container;
use bootsmith_loader::Catalog;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Everything a live connection needs, shared by all sessions.
pub(crate) struct SocketState {
    pub container: Arc<Container>,
    pub hub: Arc<SocketHub>,
    pub guards: Catalog<dyn Guard>,
    pub handlers: Catalog<dyn Handler>,
    pub connection: Option<Arc<dyn ConnectionHandler>>,
}

/// Drive one upgraded connection until the peer goes away.
pub(crate) async fn run(state: Arc<SocketState>, socket: WebSocket) {
    let id = Uuid::new_v4().to_string();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<SocketFrame>(64);
    let handle = SocketHandle::new(id.clone(), tx);
    state.hub.insert(handle.clone());
    debug!("Socket {} connected ({} total)", id, state.hub.len());

    // Outbound pump: everything emitted through the handle is
    // serialized and written here.
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&frame) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    if admit(&state, &handle).await {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<SocketFrame>(&text) {
                    Ok(frame) => dispatch_frame(&state, &handle, frame).await,
                    Err(_) => {
                        send_error(&handle, "Invalid message frame").await;
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    }

    state.hub.remove(&id);
    writer.abort();
    debug!("Socket {} disconnected", id);
}

/// Connection-level guards, then the connection handler. A rejection
/// from either closes the admission; the peer is dropped.
async fn admit(state: &Arc<SocketState>, handle: &SocketHandle) -> bool {
    let guard_names = state
        .connection
        .as_ref()
        .map(|c| c.guards())
        .unwrap_or_default();
    if !run_guards(state, handle, &guard_names, &Value::Null).await {
        return false;
    }
    if let Some(connection) = &state.connection {
        let ctx = context(state, handle, Value::Null);
        if let Err(e) = connection.handle(ctx).await {
            warn!("Connection handler rejected {}: {}", handle.id(), e);
            return false;
        }
    }
    true
}

/// Dispatch one inbound frame to its event handler.
pub(crate) async fn dispatch_frame(
    state: &Arc<SocketState>,
    handle: &SocketHandle,
    frame: SocketFrame,
) {
    let Some(handler) = state.handlers.get(&frame.event) else {
        warn!("No handler for socket event {}", frame.event);
        send_error(handle, format!("Unknown event {}", frame.event)).await;
        return;
    };

    if !run_guards(state, handle, &handler.guards(), &frame.data).await {
        return;
    }

    let ctx = context(state, handle, frame.data);
    if let Err(e) = handler.handle(ctx).await {
        warn!("Socket event {} failed: {}", frame.event, e);
        send_error(handle, e.to_string()).await;
    }
}

/// Run a guard name list. Unknown names are skipped with a warning; a
/// rejection stops the chain.
async fn run_guards(
    state: &Arc<SocketState>,
    handle: &SocketHandle,
    names: &[String],
    data: &Value,
) -> bool {
    for name in names {
        let Some(guard) = state.guards.get(name) else {
            warn!("Unknown socket guard {}, skipping", name);
            continue;
        };
        let ctx = context(state, handle, data.clone());
        if let Err(e) = guard.handle(&ctx).await {
            warn!("Guard {} rejected {}: {}", name, handle.id(), e);
            return false;
        }
    }
    true
}

fn context(state: &Arc<SocketState>, handle: &SocketHandle, data: Value) -> SocketContext {
    SocketContext {
        container: state.container.clone(),
        socket: handle.clone(),
        data,
        hub: state.hub.clone(),
    }
}

async fn send_error(handle: &SocketHandle, message: impl Into<String>) {
    let frame = SocketFrame::error(message);
    let _ = handle.emit(frame.event, frame.data).await;
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
