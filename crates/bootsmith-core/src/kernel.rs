//! Kernel: top-level boot orchestrator.
//!
//! Builds the container, registers built-in services (feature-flag
//! filtered, supplied by the application layer) followed by
//! caller-supplied services in the order given, compiles, boots every
//! service strictly sequentially in registration order, starts the
//! shared listener, and finally loads extensions against the fully
//! booted container. Any service boot failure aborts startup before a
//! single extension runs.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bootsmith_config::Config;
use tracing::{debug, info};

use crate::container::{Container, ServiceDescriptor};
use crate::error::KernelError;
use crate::extension::Extension;
use crate::server::HttpServer;
use crate::service::BootContext;

/// Kernel state machine. Terminal state is `ExtensionsLoaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelState {
    Created = 0,
    ServicesRegistered = 1,
    ServicesBooted = 2,
    ExtensionsLoaded = 3,
}

impl From<u8> for KernelState {
    fn from(v: u8) -> Self {
        match v {
            1 => KernelState::ServicesRegistered,
            2 => KernelState::ServicesBooted,
            3 => KernelState::ExtensionsLoaded,
            _ => KernelState::Created,
        }
    }
}

/// Top-level orchestrator owning the container and the extension list.
pub struct Kernel {
    config: Config,
    container: Arc<Container>,
    builtins: Vec<ServiceDescriptor>,
    services: Vec<ServiceDescriptor>,
    extensions: Vec<Arc<dyn Extension>>,
    state: AtomicU8,
    server: Option<Arc<HttpServer>>,
}

impl Kernel {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            container: Container::new(),
            builtins: Vec::new(),
            services: Vec::new(),
            extensions: Vec::new(),
            state: AtomicU8::new(KernelState::Created as u8),
            server: None,
        }
    }

    /// Built-in service descriptors, registered before everything else.
    pub fn with_builtin_services(mut self, services: Vec<ServiceDescriptor>) -> Self {
        self.builtins = services;
        self
    }

    /// Caller-supplied services, registered after the built-ins in the
    /// order given.
    pub fn with_services(mut self, services: Vec<ServiceDescriptor>) -> Self {
        self.services = services;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<Arc<dyn Extension>>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn state(&self) -> KernelState {
        self.state.load(Ordering::SeqCst).into()
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// The shared listener, present after boot unless both transports
    /// are disabled.
    pub fn server(&self) -> Option<&Arc<HttpServer>> {
        self.server.as_ref()
    }

    /// Boot the kernel. See module docs for the exact sequence.
    pub async fn boot(&mut self) -> Result<(), KernelError> {
        std::fs::create_dir_all(self.config.app_root())?;

        let needs_listener = !self.config.http.disabled || !self.config.socket.disabled;
        if needs_listener {
            let server =
                HttpServer::bind(&self.config.server.host, self.config.server.port).await?;
            self.server = Some(Arc::new(server));
        }

        for descriptor in self
            .builtins
            .drain(..)
            .chain(std::mem::take(&mut self.services))
        {
            debug!("Service {} registered", descriptor.name());
            self.container.register(descriptor)?;
        }
        self.container.compile();
        self.set_state(KernelState::ServicesRegistered);

        let ctx = BootContext::new(self.container.clone(), self.server.clone());
        for name in self.container.names() {
            debug!("Booting service {}", name);
            let service = self.container.get(&name)?;
            service
                .boot(&ctx)
                .await
                .map_err(|source| KernelError::ServiceBoot {
                    name: name.clone(),
                    source,
                })?;
        }
        self.set_state(KernelState::ServicesBooted);

        if let Some(server) = &self.server {
            server.start()?;
        }

        for extension in &self.extensions {
            info!("Loading extension: {}", extension.name());
            extension
                .load(&self.container)
                .await
                .map_err(|source| KernelError::Extension {
                    name: extension.name().to_string(),
                    source,
                })?;
        }
        self.set_state(KernelState::ExtensionsLoaded);

        Ok(())
    }

    /// Trigger graceful shutdown of the listener.
    pub fn shutdown(&self) {
        if let Some(server) = &self.server {
            server.shutdown_signal().trigger();
        }
    }

    fn set_state(&self, state: KernelState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
