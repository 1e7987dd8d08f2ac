//! # Bootsmith Artifacts
//!
//! Contracts for everything an application registers with the kernel's
//! services: HTTP routes and middlewares, socket guards and handlers,
//! queue workers, cron schedules and bus events. Identity (derived name,
//! path or event key) is assigned at registration time and never mutated;
//! behavior is a single callable slot per artifact.

mod event;
mod job;
mod middleware;
mod route;
mod schedule;
mod socket;

pub use event::{Event, EventContext};
pub use job::{Job, JobContext, Worker};
pub use middleware::HttpMiddleware;
pub use route::{Method, Reply, RequestParts, Route, RouteContext};
pub use schedule::{Schedule, ScheduleContext};
pub use socket::{
    ConnectionHandler, Guard, Handler, SocketContext, SocketFrame, SocketHandle, SocketHub,
};
