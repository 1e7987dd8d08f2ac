//! Built-in service registration.
//!
//! Turns the configuration and the application's artifact bundle into
//! the descriptor list the kernel registers first. Services gated by a
//! feature flag (database url, cache url, storage root, configured
//! queues, the disable booleans) are simply left out when the flag says
//! so; `container.has` probing does the rest at runtime.

use std::sync::Arc;

use bootsmith_config::Config;
use bootsmith_core::error::ServiceError;
use bootsmith_core::{ArgValue, Service, ServiceDescriptor};
use bootsmith_http::HttpService;
use bootsmith_loader::Artifacts;
use bootsmith_services::{
    CacheService, DatabaseService, EventService, LoggerService, QueueService, SchedulerService,
    StorageService, TemplateService,
};
use bootsmith_ws::SocketService;
use parking_lot::Mutex;

/// One-shot hand-off of non-clonable artifacts into a `Fn` factory.
type HandOff<T> = Arc<Mutex<Option<T>>>;

fn hand_off<T>(value: T) -> HandOff<T> {
    Arc::new(Mutex::new(Some(value)))
}

fn take<T>(cell: &HandOff<T>, what: &str) -> Result<T, ServiceError> {
    cell.lock()
        .take()
        .ok_or_else(|| ServiceError::Config(format!("{what} artifacts consumed twice")))
}

/// Descriptors for every enabled built-in service, in boot order. The
/// logger goes first so everything after it logs through the subscriber
/// it installs; the transports go last so every service they may
/// dispatch into is already booted.
pub fn builtin_services(config: &Config, artifacts: Artifacts) -> Vec<ServiceDescriptor> {
    let Artifacts {
        routes,
        middlewares,
        guards,
        handlers,
        connection,
        workers,
        schedules,
        events,
    } = artifacts;

    let mut services = Vec::new();

    services.push(ServiceDescriptor::new(
        bootsmith_services::logger::SERVICE_NAME,
        vec![
            ArgValue::str(&config.logging.directory),
            ArgValue::bool(config.logging.debug),
        ],
        |args| {
            Ok(Arc::new(LoggerService::new(args.str_arg(0)?, args.bool_arg(1)?))
                as Arc<dyn Service>)
        },
    ));

    services.push(ServiceDescriptor::new(
        bootsmith_services::templates::SERVICE_NAME,
        vec![ArgValue::str(&config.server.app_root)],
        |args| Ok(Arc::new(TemplateService::new(args.str_arg(0)?)) as Arc<dyn Service>),
    ));

    if !config.events.disabled {
        let events = hand_off(events);
        services.push(ServiceDescriptor::new(
            bootsmith_services::events::SERVICE_NAME,
            vec![ArgValue::number(config.events.timeout_ms)],
            move |args| {
                let catalog = take(&events, "event")?;
                Ok(Arc::new(EventService::new(catalog, args.u64_arg(0)?)) as Arc<dyn Service>)
            },
        ));
    }

    if let Some(url) = &config.database.url {
        services.push(ServiceDescriptor::new(
            bootsmith_services::database::SERVICE_NAME,
            vec![ArgValue::str(url), ArgValue::str(&config.server.app_root)],
            |args| {
                Ok(Arc::new(DatabaseService::new(args.str_arg(0)?, args.str_arg(1)?))
                    as Arc<dyn Service>)
            },
        ));
    }

    if let Some(url) = &config.cache.url {
        services.push(ServiceDescriptor::new(
            bootsmith_services::cache::SERVICE_NAME,
            vec![ArgValue::str(url)],
            |args| Ok(Arc::new(CacheService::new(args.str_arg(0)?)) as Arc<dyn Service>),
        ));
    }

    if let Some(root) = &config.storage.root {
        services.push(ServiceDescriptor::new(
            bootsmith_services::storage::SERVICE_NAME,
            vec![ArgValue::str(root)],
            |args| Ok(Arc::new(StorageService::new(args.str_arg(0)?)) as Arc<dyn Service>),
        ));
    }

    if !config.scheduler.disabled {
        let schedules = hand_off(schedules);
        services.push(ServiceDescriptor::new(
            bootsmith_services::scheduler::SERVICE_NAME,
            Vec::new(),
            move |_| {
                let catalog = take(&schedules, "schedule")?;
                Ok(Arc::new(SchedulerService::new(catalog)) as Arc<dyn Service>)
            },
        ));
    }

    if !config.queue.queues.is_empty() {
        let names = config.queue.queues.clone();
        let workers = hand_off(
            workers
                .iter()
                .map(|(_, worker)| worker.clone())
                .collect::<Vec<_>>(),
        );
        services.push(ServiceDescriptor::new(
            bootsmith_services::queue::SERVICE_NAME,
            Vec::new(),
            move |_| {
                let workers = take(&workers, "worker")?;
                Ok(Arc::new(QueueService::new(names.clone(), workers)) as Arc<dyn Service>)
            },
        ));
    }

    if !config.socket.disabled {
        let parts = hand_off((guards, handlers, connection));
        services.push(ServiceDescriptor::new(
            bootsmith_ws::SERVICE_NAME,
            Vec::new(),
            move |_| {
                let (guards, handlers, connection) = take(&parts, "socket")?;
                Ok(Arc::new(SocketService::new(guards, handlers, connection))
                    as Arc<dyn Service>)
            },
        ));
    }

    if !config.http.disabled {
        let parts = hand_off((routes, middlewares));
        services.push(ServiceDescriptor::new(
            bootsmith_http::SERVICE_NAME,
            vec![ArgValue::number(config.http.body_limit as u64)],
            move |args| {
                let (routes, middlewares) = take(&parts, "route")?;
                let body_limit = args.u64_arg(0)? as usize;
                Ok(Arc::new(HttpService::new(routes, middlewares, body_limit))
                    as Arc<dyn Service>)
            },
        ));
    }

    services
}
