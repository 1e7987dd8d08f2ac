//! The WebSocket transport service.
//!
//! Mounts `/ws` on the shared listener. Each upgraded connection gets a
//! session loop; guards, the connection handler and event handlers come
//! from the loaded catalogs.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::WebSocketUpgrade;
use axum::routing::get;
use axum::Router;
use bootsmith_artifacts::{ConnectionHandler, Guard, Handler, SocketHub};
use bootsmith_core::error::ServiceError;
use bootsmith_core::{BootContext, Service};
use bootsmith_loader::Catalog;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::session::{self, SocketState};

pub const SERVICE_NAME: &str = "socket";

pub const SOCKET_PATH: &str = "/ws";

struct Parts {
    guards: Catalog<dyn Guard>,
    handlers: Catalog<dyn Handler>,
    connection: Option<Arc<dyn ConnectionHandler>>,
}

pub struct SocketService {
    parts: Mutex<Option<Parts>>,
    state: OnceCell<Arc<SocketState>>,
}

impl SocketService {
    pub fn new(
        guards: Catalog<dyn Guard>,
        handlers: Catalog<dyn Handler>,
        connection: Option<Arc<dyn ConnectionHandler>>,
    ) -> Self {
        Self {
            parts: Mutex::new(Some(Parts {
                guards,
                handlers,
                connection,
            })),
            state: OnceCell::new(),
        }
    }

    /// The connection manager, available after boot. Services and
    /// extensions use it to broadcast to connected peers.
    pub fn hub(&self) -> Option<Arc<SocketHub>> {
        self.state.get().map(|s| s.hub.clone())
    }
}

#[async_trait]
impl Service for SocketService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn boot(&self, ctx: &BootContext) -> Result<(), ServiceError> {
        let server = ctx.require_http()?;
        let parts = self
            .parts
            .lock()
            .take()
            .ok_or_else(|| ServiceError::Config("Socket service booted twice".to_string()))?;

        let state = Arc::new(SocketState {
            container: ctx.container.clone(),
            hub: Arc::new(SocketHub::new()),
            guards: parts.guards,
            handlers: parts.handlers,
            connection: parts.connection,
        });

        // Surface unresolved guard references now rather than on the
        // first affected connection.
        for (event, handler) in state.handlers.iter() {
            for name in handler.guards() {
                if !state.guards.contains(&name) {
                    warn!("Handler {} references unknown guard {}", event, name);
                }
            }
        }
        match &state.connection {
            Some(connection) => {
                for name in connection.guards() {
                    if !state.guards.contains(&name) {
                        warn!("Connection handler references unknown guard {}", name);
                    }
                }
            }
            None => warn!("No connection handler registered, all peers are admitted"),
        }
        if self.state.set(state.clone()).is_err() {
            return Err(ServiceError::Config("Socket service booted twice".to_string()));
        }

        let ws_state = state.clone();
        let router = Router::new().route(
            SOCKET_PATH,
            get(move |upgrade: WebSocketUpgrade| {
                let state = ws_state.clone();
                async move { upgrade.on_upgrade(move |socket| session::run(state, socket)) }
            }),
        );
        server.router_cell().merge(router);

        info!(
            "Socket service listening on ws://{}{} ({} events)",
            server.local_addr(),
            SOCKET_PATH,
            state.handlers.len()
        );
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
