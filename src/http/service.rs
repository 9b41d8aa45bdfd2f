//! Tower service over a route table.
//!
//! # Responsibilities
//! - Dispatch each request through the [`RouteTable`]
//! - Turn "no match" into 404 and unhandled handler errors into 500
//! - Record per-request metrics

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tower::Service;

use crate::observability::metrics::{self, DispatchOutcome};
use crate::routing::RouteTable;

/// Cheap to clone; all clones share one table.
#[derive(Debug, Clone)]
pub struct RouterService {
    table: Arc<RouteTable>,
}

impl RouterService {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Dispatch one request. Never fails.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let (response, outcome) = match self.table.dispatch(request).await {
            Ok(Some(response)) => (response, DispatchOutcome::Handled),
            Ok(None) => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                (
                    (StatusCode::NOT_FOUND, "No matching route found").into_response(),
                    DispatchOutcome::NotFound,
                )
            }
            Err(err) => {
                tracing::error!(method = %method, path = %path, error = %err, "Handler failed");
                (
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
                    DispatchOutcome::Failed,
                )
            }
        };

        metrics::record_dispatch(&method, response.status(), outcome, start);
        response
    }
}

impl Service<Request<Body>> for RouterService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(request).await) })
    }
}
