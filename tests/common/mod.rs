//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use fnroute::routing::{Handler, HandlerResult};

/// Build a request with the given headers.
pub fn request(method: Method, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri, &[])
}

pub async fn ok(_req: Request<Body>) -> HandlerResult {
    Ok(StatusCode::OK.into_response())
}

/// Handler whose response carries `x-handler: <tag>`.
pub fn tagged(tag: &'static str) -> impl Handler {
    move |_req: Request<Body>| async move {
        let mut res = StatusCode::OK.into_response();
        res.headers_mut()
            .insert("x-handler", HeaderValue::from_static(tag));
        HandlerResult::Ok(res)
    }
}

/// The `x-handler` tag of a response, if any.
pub fn handled_by(res: &Response) -> Option<String> {
    res.headers()
        .get("x-handler")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
