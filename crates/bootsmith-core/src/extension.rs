//! Extension contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::container::Container;
use crate::error::ExtensionError;

/// A post-boot plugin that wires additional behavior into already-booted
/// services.
///
/// `load` is called exactly once per process, after every service has
/// booted. Extensions borrow the container; they must probe for each
/// service they depend on with [`Container::has`] and degrade to a logged
/// warning when a dependency is absent, never a failure.
#[async_trait]
pub trait Extension: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn load(&self, container: &Arc<Container>) -> Result<(), ExtensionError>;
}
