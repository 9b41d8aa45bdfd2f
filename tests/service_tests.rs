//! HTTP-level behaviour of the served route table.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use fnroute::app::build_table;
use fnroute::config::{parse_config, RouterConfig};
use fnroute::routing::{router, HandlerResult, RouteTable};
use fnroute::HttpServer;
use tower::ServiceExt;

mod common;
use common::{body_string, get, ok, request, tagged};

#[derive(Debug, thiserror::Error)]
#[error("database unavailable")]
struct DatabaseDown;

fn app(table: RouteTable) -> Router {
    HttpServer::new(&RouterConfig::default(), table).into_router()
}

#[tokio::test]
async fn test_no_match_is_404() {
    let table = router(|b| {
        b.get("/known", ok);
    })
    .unwrap();

    let res = app(table).oneshot(get("/unknown")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(res).await, "No matching route found");
}

#[tokio::test]
async fn test_unmapped_error_is_500() {
    let table = router(|b| {
        b.get("/db", |_req: Request<Body>| async {
            HandlerResult::Err(Box::new(DatabaseDown))
        });
    })
    .unwrap();

    let res = app(table).oneshot(get("/db")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_handled_request_passes_through() {
    let table = router(|b| {
        b.get("/hello", tagged("hello"));
    })
    .unwrap();

    let res = app(table).oneshot(get("/hello")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-handler"], "hello");
}

#[tokio::test]
async fn test_app_serves_configured_resources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("site.css"), "body { margin: 0 }").unwrap();

    let toml = format!(
        r#"
        [[resources]]
        pattern = "/assets/**"
        location = "{}"
        "#,
        dir.path().display().to_string().replace('\\', "\\\\")
    );
    let config = parse_config(&toml).unwrap();
    let router = HttpServer::new(&config, build_table(&config).unwrap()).into_router();

    let res = router.clone().oneshot(get("/assets/site.css")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/css");
    assert_eq!(body_string(res).await, "body { margin: 0 }");

    let head = router
        .clone()
        .oneshot(request(Method::HEAD, "/assets/site.css", &[]))
        .await
        .unwrap();
    assert_eq!(head.status(), StatusCode::OK);
    assert_eq!(head.headers()[header::CONTENT_LENGTH], "18");
    assert!(body_string(head).await.is_empty());

    let options = router
        .clone()
        .oneshot(request(Method::OPTIONS, "/assets/site.css", &[]))
        .await
        .unwrap();
    assert_eq!(options.headers()[header::ALLOW], "GET, HEAD, OPTIONS");

    let delete = router
        .clone()
        .oneshot(request(Method::DELETE, "/assets/site.css", &[]))
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::METHOD_NOT_ALLOWED);

    let missing = router.oneshot(get("/assets/nope.css")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let config = RouterConfig::default();
    let router = HttpServer::new(&config, build_table(&config).unwrap()).into_router();

    let res = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "OK");
}

#[tokio::test]
async fn test_concurrent_dispatch_on_shared_table() {
    let table = Arc::new(
        router(|b| {
            b.get("/a", tagged("a")).get("/b", tagged("b"));
        })
        .unwrap(),
    );

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let table = Arc::clone(&table);
            tokio::spawn(async move {
                let (uri, tag) = if i % 2 == 0 { ("/a", "a") } else { ("/b", "b") };
                let res = table.dispatch(get(uri)).await.unwrap().unwrap();
                assert_eq!(res.headers()["x-handler"], tag);
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}
