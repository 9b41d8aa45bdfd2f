//! The route table served by the `fnroute` binary.
//!
//! `GET /health` plus one resource lookup per configured `[[resources]]`
//! entry, in file order. Every response carries a `Server` header.

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::RouterConfig;
use crate::routing::{BuildError, HandlerResult, RouteTable};

const SERVER: &str = concat!("fnroute/", env!("CARGO_PKG_VERSION"));

pub fn build_table(config: &RouterConfig) -> Result<RouteTable, BuildError> {
    let mut builder = RouteTable::builder_with(config.path_matching);
    builder.get("/health", health);
    for resource in &config.resources {
        builder.resources(&resource.pattern, &resource.location);
    }
    builder.after(|_, mut response: Response| {
        response
            .headers_mut()
            .insert(header::SERVER, HeaderValue::from_static(SERVER));
        response
    });
    builder.build()
}

async fn health(_req: Request<Body>) -> HandlerResult {
    Ok((StatusCode::OK, "OK").into_response())
}
