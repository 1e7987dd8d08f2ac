//! HTTP middleware contract.

use async_trait::async_trait;
use bootsmith_core::error::HttpError;

use crate::route::RouteContext;

/// A pre-handler check or side effect on an HTTP route.
///
/// Returning `Ok(())` is the continuation: the chain proceeds to the
/// next member and finally the verb method. Returning `Err` halts the
/// chain; the error is serialized as a JSON error envelope and the verb
/// method is never invoked.
#[async_trait]
pub trait HttpMiddleware: Send + Sync + 'static {
    async fn handle(&self, ctx: &mut RouteContext) -> Result<(), HttpError>;
}
