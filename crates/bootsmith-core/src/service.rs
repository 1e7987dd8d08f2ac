//! Service contract.
//!
//! Every bootable subsystem implements [`Service`]. Instances are
//! registered by name in the [`Container`](crate::Container) and booted
//! sequentially by the [`Kernel`](crate::Kernel) in registration order.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::container::Container;
use crate::error::ServiceError;
use crate::server::HttpServer;

/// Arguments passed to every service boot.
#[derive(Clone)]
pub struct BootContext {
    /// The compiled container. Services reach each other only through it.
    pub container: Arc<Container>,

    /// Shared low-level listener, present unless both transports are
    /// disabled. Transport services mount their routers on it.
    pub http: Option<Arc<HttpServer>>,
}

impl BootContext {
    pub fn new(container: Arc<Container>, http: Option<Arc<HttpServer>>) -> Self {
        Self { container, http }
    }

    /// The shared server, or a boot error when a transport needs it.
    pub fn require_http(&self) -> Result<&Arc<HttpServer>, ServiceError> {
        self.http
            .as_ref()
            .ok_or_else(|| ServiceError::Config("HTTP server is not available".to_string()))
    }
}

/// Core trait for all services.
///
/// Boot takes `&self`; services keep boot-time state behind interior
/// mutability (`OnceCell`, locks) since instances are shared through the
/// container.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// The name this service was registered under.
    fn name(&self) -> &str;

    /// Boot the service. A boot failure is fatal to kernel startup.
    async fn boot(&self, ctx: &BootContext) -> Result<(), ServiceError>;

    /// Downcast support for concrete access through the container.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
