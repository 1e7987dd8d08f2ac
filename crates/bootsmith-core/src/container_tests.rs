use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::*;
use crate::error::{ContainerError, ServiceError};
use crate::service::{BootContext, Service};

struct DummyService {
    name: String,
    tag: Option<String>,
}

#[async_trait]
impl Service for DummyService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

struct OtherService;

#[async_trait]
impl Service for OtherService {
    fn name(&self) -> &str {
        "other"
    }

    async fn boot(&self, _ctx: &BootContext) -> Result<(), ServiceError> {
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn dummy_descriptor(name: &str) -> ServiceDescriptor {
    let service_name = name.to_string();
    ServiceDescriptor::new(name, vec![], move |_args| {
        Ok(Arc::new(DummyService {
            name: service_name.clone(),
            tag: None,
        }) as Arc<dyn Service>)
    })
}

#[test]
fn test_get_returns_same_instance() {
    let container = Container::new();
    container.register(dummy_descriptor("logger")).unwrap();
    container.compile();

    let a = container.get("logger").unwrap();
    let b = container.get("logger").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_get_unregistered_fails_not_found() {
    let container = Container::new();
    container.compile();
    let result = container.get("ghost");
    assert!(matches!(result, Err(ContainerError::NotFound(_))));
}

#[test]
fn test_has_never_fails() {
    let container = Container::new();
    assert!(!container.has("anything"));
    container.register(dummy_descriptor("cache")).unwrap();
    assert!(container.has("cache"));
}

#[test]
fn test_register_after_compile_fails() {
    let container = Container::new();
    container.register(dummy_descriptor("first")).unwrap();
    container.compile();

    let result = container.register(dummy_descriptor("late"));
    assert!(matches!(result, Err(ContainerError::Compiled(_))));
}

#[test]
fn test_register_duplicate_fails() {
    let container = Container::new();
    container.register(dummy_descriptor("logger")).unwrap();
    let result = container.register(dummy_descriptor("logger"));
    assert!(matches!(result, Err(ContainerError::AlreadyRegistered(_))));
}

#[test]
fn test_lazy_construction_runs_once() {
    let container = Container::new();
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    container
        .register(ServiceDescriptor::new("counted", vec![], move |_args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(DummyService {
                name: "counted".to_string(),
                tag: None,
            }) as Arc<dyn Service>)
        }))
        .unwrap();
    container.compile();

    assert_eq!(built.load(Ordering::SeqCst), 0);
    container.get("counted").unwrap();
    container.get("counted").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_literal_args_pass_through() {
    let container = Container::new();
    container
        .register(ServiceDescriptor::new(
            "tagged",
            vec![ArgValue::str("./logs"), ArgValue::bool(true)],
            |args| {
                assert!(args.bool_arg(1)?);
                Ok(Arc::new(DummyService {
                    name: "tagged".to_string(),
                    tag: Some(args.str_arg(0)?.to_string()),
                }) as Arc<dyn Service>)
            },
        ))
        .unwrap();
    container.compile();

    let service = container.get_as::<DummyService>("tagged").unwrap();
    assert_eq!(service.tag.as_deref(), Some("./logs"));
}

#[test]
fn test_container_ref_resolves_to_self() {
    let container = Container::new();
    container.register(dummy_descriptor("logger")).unwrap();
    container
        .register(ServiceDescriptor::new(
            "dependent",
            vec![ArgValue::ContainerRef],
            |args| {
                // Self-referential injection: the handle reaches siblings.
                assert!(args.container().has("logger"));
                Ok(Arc::new(DummyService {
                    name: "dependent".to_string(),
                    tag: None,
                }) as Arc<dyn Service>)
            },
        ))
        .unwrap();
    container.compile();
    container.get("dependent").unwrap();
}

#[test]
fn test_get_as_wrong_type() {
    let container = Container::new();
    container.register(dummy_descriptor("logger")).unwrap();
    container.compile();

    let result = container.get_as::<OtherService>("logger");
    assert!(matches!(result, Err(ContainerError::WrongType(_))));
}

#[test]
fn test_factory_error_surfaces_as_construction() {
    let container = Container::new();
    container
        .register(ServiceDescriptor::new("broken", vec![], |_args| {
            Err(ServiceError::Config("no url".to_string()))
        }))
        .unwrap();
    container.compile();

    let result = container.get("broken");
    assert!(matches!(result, Err(ContainerError::Construction { .. })));
}

#[test]
fn test_names_preserve_registration_order() {
    let container = Container::new();
    container.register(dummy_descriptor("logger")).unwrap();
    container.register(dummy_descriptor("events")).unwrap();
    container.register(dummy_descriptor("http")).unwrap();
    assert_eq!(container.names(), vec!["logger", "events", "http"]);
}
