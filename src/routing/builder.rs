//! Route table construction.
//!
//! # Responsibilities
//! - Collect routes, nested tables, resource lookups and interceptors in order
//! - Compile predicates and patterns once, at build time
//! - Reject empty tables and invalid patterns or media types
//!
//! # Design Decisions
//! - Methods take `&mut self` so registration reads as a chain
//! - The first error is remembered and returned from [`RouteTableBuilder::build`]

use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;
use axum::response::Response;

use crate::config::PathMatchingConfig;
use crate::routing::error::BuildError;
use crate::routing::filter::{ErrorMapper, Filter, Interceptors};
use crate::routing::handler::{BoxError, Handler};
use crate::routing::matcher::AnyMatcher;
use crate::routing::predicate::{self, Predicate};
use crate::routing::resources::{PathResources, ResourceLookup};
use crate::routing::router::{Node, RouteEntry, RouteTable};

/// Builds a [`RouteTable`].
pub struct RouteTableBuilder {
    options: PathMatchingConfig,
    nodes: Vec<Node>,
    interceptors: Interceptors,
    error: Option<BuildError>,
}

impl RouteTableBuilder {
    pub(crate) fn new(options: PathMatchingConfig) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            interceptors: Interceptors::default(),
            error: None,
        }
    }

    fn record<T>(&mut self, result: Result<T, BuildError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                None
            }
        }
    }

    /// Route requests accepted by `predicate` to `handler`.
    pub fn route<H: Handler>(&mut self, predicate: Predicate, handler: H) -> &mut Self {
        if let Some(matcher) = self.record(predicate.compile(self.options)) {
            self.nodes.push(Node::Route(RouteEntry {
                matcher,
                handler: Arc::new(handler),
            }));
        }
        self
    }

    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::get(pattern), handler)
    }

    pub fn head<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::head(pattern), handler)
    }

    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::post(pattern), handler)
    }

    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::put(pattern), handler)
    }

    pub fn patch<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::patch(pattern), handler)
    }

    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::delete(pattern), handler)
    }

    pub fn options<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(predicate::options(pattern), handler)
    }

    /// Nest a table built by `f`, entered only when `guard` accepts.
    ///
    /// Path conditions in the guard match as prefixes, and the nested table
    /// sees the rest of the path. Under `and` they apply left to right, so
    /// `method(GET).and(path("/api"))` hands `/foo` on for `GET /api/foo`.
    pub fn nest<F>(&mut self, guard: Predicate, f: F) -> &mut Self
    where
        F: FnOnce(&mut RouteTableBuilder),
    {
        let Some(guard) = self.record(guard.compile(self.options)) else {
            return self;
        };

        let mut nested = RouteTableBuilder::new(self.options);
        f(&mut nested);
        if let Some(table) = self.record(nested.build()) {
            self.nodes.push(Node::Nest(guard, table));
        }
        self
    }

    pub fn nest_path<F>(&mut self, prefix: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut RouteTableBuilder),
    {
        self.nest(predicate::path(prefix), f)
    }

    /// Append an already built table, consulted at this position.
    pub fn add(&mut self, table: RouteTable) -> &mut Self {
        self.nodes.push(Node::Nest(Box::new(AnyMatcher), table));
        self
    }

    /// Serve files under `location` for paths matching `pattern`.
    pub fn resources(&mut self, pattern: &str, location: impl Into<PathBuf>) -> &mut Self {
        let lookup = PathResources::new(pattern, location, self.options);
        if let Some(lookup) = self.record(lookup) {
            self.nodes.push(Node::Resources(Arc::new(lookup)));
        }
        self
    }

    pub fn resource_lookup<L: ResourceLookup>(&mut self, lookup: L) -> &mut Self {
        self.nodes.push(Node::Resources(Arc::new(lookup)));
        self
    }

    pub fn filter<F: Filter>(&mut self, filter: F) -> &mut Self {
        self.interceptors.filters.push(Arc::new(filter));
        self
    }

    pub fn before<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Request<Body>) -> Request<Body> + Send + Sync + 'static,
    {
        self.interceptors.before.push(Box::new(hook));
        self
    }

    /// Post-process successful responses. The hook also gets the head of the
    /// request as the handler saw it, after any before hooks.
    pub fn after<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Parts, Response) -> Response + Send + Sync + 'static,
    {
        self.interceptors.after.push(Box::new(hook));
        self
    }

    /// Turn errors accepted by `predicate` into the response from `handler`,
    /// which also gets the head of the failed request.
    pub fn on_error<P, H>(&mut self, predicate: P, handler: H) -> &mut Self
    where
        P: Fn(&BoxError) -> bool + Send + Sync + 'static,
        H: Fn(BoxError, &Parts) -> Response + Send + Sync + 'static,
    {
        self.interceptors
            .error_mappers
            .push(ErrorMapper::new(predicate, handler));
        self
    }

    /// Turn errors of type `E` into the response from `handler`.
    pub fn on_error_type<E, H>(&mut self, handler: H) -> &mut Self
    where
        E: std::error::Error + 'static,
        H: Fn(BoxError, &Parts) -> Response + Send + Sync + 'static,
    {
        self.interceptors
            .error_mappers
            .push(ErrorMapper::for_type::<E, H>(handler));
        self
    }

    /// Finish the table.
    ///
    /// Leaves the builder empty, so it can be reused.
    pub fn build(&mut self) -> Result<RouteTable, BuildError> {
        let nodes = mem::take(&mut self.nodes);
        let interceptors = mem::take(&mut self.interceptors);
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if nodes.is_empty() {
            return Err(BuildError::EmptyTable);
        }
        Ok(RouteTable {
            nodes,
            interceptors: Arc::new(interceptors),
        })
    }
}

/// Build a table with default path matching.
pub fn router<F>(f: F) -> Result<RouteTable, BuildError>
where
    F: FnOnce(&mut RouteTableBuilder),
{
    router_with(PathMatchingConfig::default(), f)
}

pub fn router_with<F>(options: PathMatchingConfig, f: F) -> Result<RouteTable, BuildError>
where
    F: FnOnce(&mut RouteTableBuilder),
{
    let mut builder = RouteTableBuilder::new(options);
    f(&mut builder);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::HandlerResult;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    async fn ok(_req: Request<Body>) -> HandlerResult {
        Ok(StatusCode::OK.into_response())
    }

    #[test]
    fn test_empty_table_fails() {
        assert!(matches!(router(|_| {}), Err(BuildError::EmptyTable)));
        assert!(matches!(
            RouteTable::builder().build(),
            Err(BuildError::EmptyTable)
        ));
    }

    #[test]
    fn test_empty_nested_table_fails() {
        let result = router(|b| {
            b.get("/", ok).nest_path("/api", |_| {});
        });
        assert!(matches!(result, Err(BuildError::EmptyTable)));
    }

    #[test]
    fn test_first_error_is_reported() {
        let result = router(|b| {
            b.get("missing-slash", ok)
                .route(predicate::accept(["json"]), ok)
                .get("/fine", ok);
        });
        match result {
            Err(BuildError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "missing-slash"),
            other => panic!("unexpected build result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_guard_and_resource_pattern() {
        assert!(matches!(
            router(|b| {
                b.nest_path("api", |n| {
                    n.get("/", ok);
                });
            }),
            Err(BuildError::InvalidPattern { .. })
        ));
        assert!(matches!(
            router(|b| {
                b.resources("static/**", "/tmp");
            }),
            Err(BuildError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_builder_is_reusable_after_build() {
        let mut builder = RouteTable::builder();
        builder.get("/a", ok);
        assert!(builder.build().is_ok());
        assert!(matches!(builder.build(), Err(BuildError::EmptyTable)));
        builder.get("/b", ok);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_table_with_only_interceptors_is_empty() {
        let result = router(|b| {
            b.before(|req| req).after(|_, res| res);
        });
        assert!(matches!(result, Err(BuildError::EmptyTable)));
    }
}
