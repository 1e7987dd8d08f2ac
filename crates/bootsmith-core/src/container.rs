//! Service container: name-keyed singleton factory with lazy construction.
//!
//! Descriptors are registered during the kernel's boot pass, the container
//! is compiled (frozen), and instances are constructed on first `get` and
//! memoized for the process lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::error::{ContainerError, ServiceError};
use crate::service::Service;

/// A constructor argument: either a literal value or an injection
/// placeholder resolved by the container.
#[derive(Clone, Debug)]
pub enum ArgValue {
    /// Passed through to the factory as-is.
    Literal(serde_json::Value),
    /// Resolved to the container itself, enabling self-referential
    /// injection.
    ContainerRef,
}

impl ArgValue {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Literal(serde_json::Value::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Literal(serde_json::Value::Bool(value))
    }

    pub fn number(value: u64) -> Self {
        Self::Literal(serde_json::Value::from(value))
    }
}

/// Arguments handed to a service factory, with placeholders resolved.
pub struct ResolvedArgs {
    container: Arc<Container>,
    args: Vec<ArgValue>,
}

impl ResolvedArgs {
    /// The container a `ContainerRef` placeholder resolves to.
    pub fn container(&self) -> Arc<Container> {
        self.container.clone()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    fn literal(&self, index: usize) -> Result<&serde_json::Value, ServiceError> {
        match self.args.get(index) {
            Some(ArgValue::Literal(value)) => Ok(value),
            Some(ArgValue::ContainerRef) => Err(ServiceError::ArgType {
                index,
                expected: "literal",
            }),
            None => Err(ServiceError::MissingArg(index)),
        }
    }

    pub fn str_arg(&self, index: usize) -> Result<&str, ServiceError> {
        self.literal(index)?.as_str().ok_or(ServiceError::ArgType {
            index,
            expected: "string",
        })
    }

    pub fn bool_arg(&self, index: usize) -> Result<bool, ServiceError> {
        self.literal(index)?.as_bool().ok_or(ServiceError::ArgType {
            index,
            expected: "bool",
        })
    }

    pub fn u64_arg(&self, index: usize) -> Result<u64, ServiceError> {
        self.literal(index)?.as_u64().ok_or(ServiceError::ArgType {
            index,
            expected: "number",
        })
    }
}

type ServiceFactory =
    Box<dyn Fn(ResolvedArgs) -> Result<Arc<dyn Service>, ServiceError> + Send + Sync>;

/// A registered, not-yet-constructed service.
pub struct ServiceDescriptor {
    name: String,
    args: Vec<ArgValue>,
    factory: ServiceFactory,
}

impl ServiceDescriptor {
    pub fn new<F>(name: impl Into<String>, args: Vec<ArgValue>, factory: F) -> Self
    where
        F: Fn(ResolvedArgs) -> Result<Arc<dyn Service>, ServiceError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            args,
            factory: Box::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Name-keyed singleton factory with lazy construction.
pub struct Container {
    descriptors: RwLock<HashMap<String, ServiceDescriptor>>,
    order: RwLock<Vec<String>>,
    instances: DashMap<String, Arc<dyn Service>>,
    compiled: AtomicBool,
    // Serializes lazy construction so concurrent first-gets observe a
    // single instance. Factories must not call `get` themselves; they
    // receive the container handle for later use.
    build_lock: Mutex<()>,
}

impl Container {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            descriptors: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
            instances: DashMap::new(),
            compiled: AtomicBool::new(false),
            build_lock: Mutex::new(()),
        })
    }

    /// Register a service descriptor.
    ///
    /// Fails once the container is compiled, or when the name is taken.
    pub fn register(&self, descriptor: ServiceDescriptor) -> Result<(), ContainerError> {
        if self.compiled.load(Ordering::SeqCst) {
            return Err(ContainerError::Compiled(descriptor.name.clone()));
        }
        let mut descriptors = self.descriptors.write();
        if descriptors.contains_key(&descriptor.name) {
            return Err(ContainerError::AlreadyRegistered(descriptor.name.clone()));
        }
        self.order.write().push(descriptor.name.clone());
        descriptors.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Finalize registration. After this point `register` fails.
    pub fn compile(&self) {
        self.compiled.store(true, Ordering::SeqCst);
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.load(Ordering::SeqCst)
    }

    /// Existence probe. Never fails.
    pub fn has(&self, name: &str) -> bool {
        self.instances.contains_key(name) || self.descriptors.read().contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.read().clone()
    }

    /// Get the singleton for `name`, constructing it on first access.
    pub fn get(self: &Arc<Self>, name: &str) -> Result<Arc<dyn Service>, ContainerError> {
        if let Some(instance) = self.instances.get(name) {
            return Ok(instance.clone());
        }

        let _guard = self.build_lock.lock();
        if let Some(instance) = self.instances.get(name) {
            return Ok(instance.clone());
        }

        let descriptors = self.descriptors.read();
        let descriptor = descriptors
            .get(name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))?;

        let resolved = ResolvedArgs {
            container: self.clone(),
            args: descriptor.args.clone(),
        };
        let instance =
            (descriptor.factory)(resolved).map_err(|e| ContainerError::Construction {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        self.instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }

    /// Get a service and downcast it to its concrete type.
    pub fn get_as<T: Service>(self: &Arc<Self>, name: &str) -> Result<Arc<T>, ContainerError> {
        let instance = self.get(name)?;
        instance
            .as_any_arc()
            .downcast::<T>()
            .map_err(|_| ContainerError::WrongType(name.to_string()))
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
