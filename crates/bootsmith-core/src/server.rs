//! Shared low-level HTTP listener.
//!
//! The kernel binds one [`HttpServer`] and passes it to services through
//! the boot context. Transport services never own a listener; they mount
//! routers into the server's [`RouterCell`], which can be swapped in
//! place at any time. That is what makes dynamic route registration after
//! boot (used by extensions) possible.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::Response;
use axum::Router;
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tracing::{error, info};

use crate::error::KernelError;

/// Shutdown signal for graceful shutdown.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Trigger shutdown.
    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A swappable [`Router`] served behind a read lock.
///
/// Each request clones the current router out of the lock, so a swap
/// affects the next request without interrupting in-flight ones.
#[derive(Clone, Default)]
pub struct RouterCell {
    inner: Arc<RwLock<Router>>,
}

impl RouterCell {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Router::new())),
        }
    }

    /// Replace the current router.
    pub fn set(&self, router: Router) {
        *self.inner.write() = router;
    }

    /// Merge additional routes into the current router.
    pub fn merge(&self, other: Router) {
        let mut guard = self.inner.write();
        let current = std::mem::take(&mut *guard);
        *guard = current.merge(other);
    }

    /// Snapshot of the current router.
    pub fn router(&self) -> Router {
        self.inner.read().clone()
    }
}

impl tower::Service<Request> for RouterCell {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let router = self.inner.read().clone();
        Box::pin(async move { router.oneshot(req).await })
    }
}

/// The shared listener: one bound TCP socket plus the router cell every
/// transport service mounts itself on.
pub struct HttpServer {
    listener: Mutex<Option<TcpListener>>,
    addr: SocketAddr,
    cell: RouterCell,
    started: AtomicBool,
    shutdown: ShutdownSignal,
}

impl HttpServer {
    /// Bind the listener. Port 0 binds an ephemeral port.
    pub async fn bind(host: &str, port: u16) -> Result<Self, KernelError> {
        let listener = TcpListener::bind((host, port)).await?;
        let addr = listener.local_addr()?;
        Ok(Self {
            listener: Mutex::new(Some(listener)),
            addr,
            cell: RouterCell::new(),
            started: AtomicBool::new(false),
            shutdown: ShutdownSignal::new(),
        })
    }

    /// The bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The swappable router every request is dispatched through.
    pub fn router_cell(&self) -> RouterCell {
        self.cell.clone()
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Start the accept loop on a background task.
    pub fn start(&self) -> Result<(), KernelError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(KernelError::AlreadyStarted);
        }
        let listener = self
            .listener
            .lock()
            .take()
            .ok_or(KernelError::AlreadyStarted)?;

        let app = Router::new().fallback_service(self.cell.clone());
        let mut shutdown = self.shutdown.subscribe();
        let addr = self.addr;

        tokio::spawn(async move {
            info!("Listener serving on http://{}", addr);
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            });
            if let Err(e) = serve.await {
                error!("Listener failed: {}", e);
            }
        });
        Ok(())
    }
}
