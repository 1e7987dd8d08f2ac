//! # Bootsmith Services
//!
//! The built-in service implementations registered by the default boot:
//! logging, the template manager, the event bus, the cron scheduler,
//! job queues, the TTL cache, the SQLite database and filesystem object
//! storage. The HTTP and WebSocket transports live in their own crates.

pub mod cache;
pub mod database;
pub mod events;
pub mod logger;
pub mod queue;
pub mod scheduler;
pub mod storage;
pub mod templates;

pub use cache::CacheService;
pub use database::DatabaseService;
pub use events::EventService;
pub use logger::LoggerService;
pub use queue::{QueueService, QueueStats};
pub use scheduler::SchedulerService;
pub use storage::{ObjectInfo, StorageService};
pub use templates::TemplateService;
