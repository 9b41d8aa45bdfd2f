//! Interceptors: filters, before/after hooks and error mappers.
//!
//! # Responsibilities
//! - Wrap a matched handler with the interceptors of the table it was found in
//! - Run before hooks on the request and after hooks on the response
//! - Hand after hooks and error mappers the request head (`Parts`) they answer
//! - Recover handler errors through the first accepting error mapper
//!
//! # Design Decisions
//! - Composition for one table:
//!   `error_mappers(filter_1(filter_2(.. after(handler(before(req))))))`
//! - Filters run in registration order, the first registered outermost
//! - A filter may skip `next` entirely or call it several times
//! - Unmatched errors propagate unchanged
//! - The request head is cloned only for tables with after hooks or error mappers

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;
use axum::response::Response;

use crate::routing::handler::{BoxError, BoxHandler, Handler, HandlerFuture, HandlerResult};

/// The rest of the chain, handed to a [`Filter`].
#[derive(Clone)]
pub struct Next {
    inner: BoxHandler,
}

impl Next {
    pub(crate) fn new(inner: BoxHandler) -> Self {
        Self { inner }
    }

    /// Invoke the remaining chain.
    pub fn run(&self, req: Request<Body>) -> HandlerFuture {
        self.inner.call(req)
    }
}

/// Wraps the handler chain of a table.
pub trait Filter: Send + Sync + 'static {
    fn filter(&self, req: Request<Body>, next: Next) -> HandlerFuture;
}

impl<F, Fut> Filter for F
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn filter(&self, req: Request<Body>, next: Next) -> HandlerFuture {
        Box::pin(self(req, next))
    }
}

pub type BeforeHook = Box<dyn Fn(Request<Body>) -> Request<Body> + Send + Sync>;

/// Runs on a successful response, with the head of the request the handler saw.
pub type AfterHook = Box<dyn Fn(&Parts, Response) -> Response + Send + Sync>;

type ErrorHandler = Box<dyn Fn(BoxError, &Parts) -> Response + Send + Sync>;

/// Fallback for handler errors accepted by its predicate.
pub struct ErrorMapper {
    predicate: Box<dyn Fn(&BoxError) -> bool + Send + Sync>,
    handler: ErrorHandler,
}

impl ErrorMapper {
    pub fn new<P, H>(predicate: P, handler: H) -> Self
    where
        P: Fn(&BoxError) -> bool + Send + Sync + 'static,
        H: Fn(BoxError, &Parts) -> Response + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        }
    }

    /// Accepts errors whose concrete type is `E`.
    pub fn for_type<E, H>(handler: H) -> Self
    where
        E: std::error::Error + 'static,
        H: Fn(BoxError, &Parts) -> Response + Send + Sync + 'static,
    {
        Self::new(|err: &BoxError| err.is::<E>(), handler)
    }
}

/// Interceptors registered on one route table.
#[derive(Default)]
pub struct Interceptors {
    pub(crate) filters: Vec<Arc<dyn Filter>>,
    pub(crate) before: Vec<BeforeHook>,
    pub(crate) after: Vec<AfterHook>,
    pub(crate) error_mappers: Vec<ErrorMapper>,
}

impl Interceptors {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.before.is_empty()
            && self.after.is_empty()
            && self.error_mappers.is_empty()
    }

    /// Compose `handler` with these interceptors.
    pub(crate) fn wrap(self: &Arc<Self>, handler: BoxHandler) -> BoxHandler {
        if self.is_empty() {
            return handler;
        }

        let mut chain: BoxHandler = if self.before.is_empty() && self.after.is_empty() {
            handler
        } else {
            let hooks = Arc::clone(self);
            Arc::new(move |req: Request<Body>| {
                let req = hooks.before.iter().fold(req, |req, hook| hook(req));
                let (req, parts) = if hooks.after.is_empty() {
                    (req, None)
                } else {
                    let (req, parts) = snapshot(req);
                    (req, Some(parts))
                };
                let fut = handler.call(req);
                let hooks = Arc::clone(&hooks);
                async move {
                    fut.await.map(|res| match parts {
                        Some(parts) => hooks.after.iter().fold(res, |res, hook| hook(&parts, res)),
                        None => res,
                    })
                }
            })
        };

        for filter in self.filters.iter().rev() {
            let filter = Arc::clone(filter);
            let next = chain;
            chain = Arc::new(move |req: Request<Body>| filter.filter(req, Next::new(Arc::clone(&next))));
        }

        if self.error_mappers.is_empty() {
            return chain;
        }

        let mappers = Arc::clone(self);
        Arc::new(move |req: Request<Body>| {
            let (req, parts) = snapshot(req);
            let fut = chain.call(req);
            let mappers = Arc::clone(&mappers);
            async move {
                match fut.await {
                    Ok(res) => Ok(res),
                    Err(err) => mappers.recover(err, &parts),
                }
            }
        })
    }

    fn recover(&self, err: BoxError, parts: &Parts) -> HandlerResult {
        match self.error_mappers.iter().find(|m| (m.predicate)(&err)) {
            Some(mapper) => {
                tracing::debug!(
                    error = %err,
                    method = %parts.method,
                    path = parts.uri.path(),
                    "handler error mapped to fallback response"
                );
                Ok((mapper.handler)(err, parts))
            }
            None => Err(err),
        }
    }
}

/// Split off a copy of the request head; the body is left in place.
fn snapshot(req: Request<Body>) -> (Request<Body>, Parts) {
    let (parts, body) = req.into_parts();
    let head = parts.clone();
    (Request::from_parts(parts, body), head)
}
