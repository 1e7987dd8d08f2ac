//! # Bootsmith
//!
//! An opinionated service kernel: register artifacts (routes, socket
//! handlers, workers, schedules, events), point it at a TOML config,
//! and boot. Built-in services cover logging, templates, an event bus,
//! a cron scheduler, job queues, a TTL cache, SQLite and object
//! storage; extensions add endpoints after boot.
//!
//! ```no_run
//! use bootsmith::{builtin_services, Artifacts, Config, Kernel};
//!
//! # async fn run() -> Result<(), bootsmith::KernelError> {
//! let config = Config::default();
//! let mut kernel = Kernel::new(config.clone())
//!     .with_builtin_services(builtin_services(&config, Artifacts::new()));
//! kernel.boot().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod builtins;

pub use bootsmith_artifacts::{
    ConnectionHandler, Event, EventContext, Guard, Handler, HttpMiddleware, Job, JobContext,
    Method, Reply, RequestParts, Route, RouteContext, Schedule, ScheduleContext, SocketContext,
    SocketFrame, SocketHandle, SocketHub, Worker,
};
pub use bootsmith_config::{Config, ConfigError, ConfigLoader};
pub use bootsmith_core::error::{
    ContainerError, DatabaseError, EventError, ExtensionError, HttpError, KernelError, QueueError,
    ServiceError, SocketError, StorageError, TemplateError,
};
pub use bootsmith_core::{
    ArgValue, BootContext, Container, Extension, HttpServer, Kernel, KernelState, ResolvedArgs,
    RouterCell, Service, ServiceDescriptor, ShutdownSignal,
};
pub use bootsmith_http::HttpService;
pub use bootsmith_loader::{paths, scaffold, Artifacts, Catalog};
pub use bootsmith_queue_dashboard::QueueDashboard;
pub use bootsmith_services::{
    CacheService, DatabaseService, EventService, LoggerService, ObjectInfo, QueueService,
    QueueStats, SchedulerService, StorageService, TemplateService,
};
pub use bootsmith_storage_browser::StorageBrowser;
pub use bootsmith_ws::SocketService;
pub use builtins::builtin_services;
