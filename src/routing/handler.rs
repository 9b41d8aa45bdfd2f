//! Request handlers.
//!
//! A handler turns a request into a future response. Any
//! `Fn(Request<Body>) -> impl Future<Output = HandlerResult>` is a handler.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

/// Error type produced by handlers, filters and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type HandlerResult = Result<Response, BoxError>;

pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// Produces the response for a matched request.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request<Body>) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, req: Request<Body>) -> HandlerFuture {
        Box::pin(self(req))
    }
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;
