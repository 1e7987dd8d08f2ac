use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use bootsmith_artifacts::{Method, Reply, RouteContext};
use bootsmith_core::error::HttpError;
use bootsmith_core::HttpServer;
use serde_json::json;
use tower::ServiceExt;

use super::*;

struct HelloRoute;

#[async_trait]
impl Route for HelloRoute {
    fn methods(&self) -> Vec<Method> {
        vec![Method::Get]
    }

    fn middlewares(&self, _method: Method) -> Vec<String> {
        vec!["auth".to_string()]
    }

    async fn get(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
        Ok(Reply::json(json!({ "hello": true })))
    }
}

struct RejectAll;

#[async_trait]
impl HttpMiddleware for RejectAll {
    async fn handle(&self, _ctx: &mut RouteContext) -> Result<(), HttpError> {
        Err(HttpError::Status {
            status: 401,
            message: "No token provided".to_string(),
        })
    }
}

async fn booted_service() -> (Arc<HttpService>, Arc<HttpServer>) {
    let mut routes: Catalog<dyn Route> = Catalog::new();
    routes.register("/", Arc::new(HelloRoute));
    let mut middlewares: Catalog<dyn HttpMiddleware> = Catalog::new();
    middlewares.register("auth", Arc::new(RejectAll));

    let service = Arc::new(HttpService::new(routes, middlewares, 1024));
    let server = Arc::new(HttpServer::bind("127.0.0.1", 0).await.unwrap());
    let container = Container::new();
    container.compile();
    service
        .boot(&BootContext::new(container, Some(server.clone())))
        .await
        .unwrap();
    (service, server)
}

fn req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_raw_mount_bypasses_envelope_and_middleware() {
    let (service, server) = booted_service().await;
    service.register_raw(
        "/auth",
        Router::new().route("/whoami", get(|| async { "raw-auth" })),
    );

    let cell = server.router_cell();
    let response = cell.clone().oneshot(req("/auth/whoami")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // No envelope, no success flag: the sub-router's body verbatim.
    assert_eq!(bytes.as_ref(), b"raw-auth");

    // Enveloped routes behind the same listener still run their chain.
    let response = cell.oneshot(req("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_routes_registered_after_boot_are_served() {
    let (service, server) = booted_service().await;

    let cell = server.router_cell();
    let response = cell.clone().oneshot(req("/late")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    struct LateRoute;

    #[async_trait]
    impl Route for LateRoute {
        fn methods(&self) -> Vec<Method> {
            vec![Method::Get]
        }

        async fn get(&self, _ctx: RouteContext) -> Result<Reply, HttpError> {
            Ok(Reply::json(json!({ "late": true })))
        }
    }

    service.register_routes(vec![("/late".to_string(), Arc::new(LateRoute) as Arc<dyn Route>)]);
    let response = cell.oneshot(req("/late")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
