//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes, nested tables and resource lookups
//! - Look up the handler for a request, in registration order
//! - Dispatch the request and return the response, no-match, or the handler error
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins; a nested table is searched at its registration position
//! - A miss inside a nested table falls through to the next sibling
//! - Explicit `None` for no match rather than a silent default

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::config::PathMatchingConfig;
use crate::routing::builder::RouteTableBuilder;
use crate::routing::filter::Interceptors;
use crate::routing::handler::{BoxError, BoxHandler};
use crate::routing::matcher::Matcher;
use crate::routing::request::RouteRequest;
use crate::routing::resources::{resource_handler, ResourceLookup};

/// A predicate/handler pair.
pub(crate) struct RouteEntry {
    pub(crate) matcher: Box<dyn Matcher>,
    pub(crate) handler: BoxHandler,
}

pub(crate) enum Node {
    Route(RouteEntry),
    /// A nested table, entered with the request its guard hands on.
    Nest(Box<dyn Matcher>, RouteTable),
    Resources(Arc<dyn ResourceLookup>),
}

/// An immutable, ordered routing table.
pub struct RouteTable {
    pub(crate) nodes: Vec<Node>,
    pub(crate) interceptors: Arc<Interceptors>,
}

impl RouteTable {
    /// Start building a table with default path matching.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new(PathMatchingConfig::default())
    }

    /// Start building a table with the given path matching options.
    pub fn builder_with(options: PathMatchingConfig) -> RouteTableBuilder {
        RouteTableBuilder::new(options)
    }

    /// Find the handler for a request, wrapped with the interceptors of every
    /// table between the match and this one.
    pub fn find_handler(&self, request: &Request<Body>) -> Option<BoxHandler> {
        self.find(&RouteRequest::new(request))
    }

    fn find(&self, req: &RouteRequest<'_>) -> Option<BoxHandler> {
        for (index, node) in self.nodes.iter().enumerate() {
            let found = match node {
                Node::Route(entry) => entry
                    .matcher
                    .matches(req)
                    .then(|| Arc::clone(&entry.handler)),
                Node::Nest(guard, table) => guard
                    .nest(req)
                    .and_then(|nested| table.find(&nested)),
                Node::Resources(lookup) => lookup.lookup(req.path()).map(resource_handler),
            };

            if let Some(handler) = found {
                tracing::trace!(index, path = req.path(), "route matched");
                return Some(self.interceptors.wrap(handler));
            }
        }
        None
    }

    /// Route and invoke the request.
    ///
    /// `Ok(None)` means no route matched; `Err` is a handler error no error
    /// mapper accepted.
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Option<Response>, BoxError> {
        let Some(handler) = self.find_handler(&request) else {
            return Ok(None);
        };
        handler.call(request).await.map(Some)
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for node in &self.nodes {
            match node {
                Node::Route(entry) => list.entry(&entry.matcher),
                Node::Nest(guard, table) => list.entry(&(guard, table)),
                Node::Resources(_) => list.entry(&"<resources>"),
            };
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::{Handler, HandlerResult};
    use crate::routing::predicate::{self, method};
    use axum::http::{HeaderValue, Method, StatusCode};
    use axum::response::IntoResponse;

    async fn tagged(req: Request<Body>, tag: &'static str) -> HandlerResult {
        let mut res = StatusCode::OK.into_response();
        res.headers_mut().insert("x-handler", HeaderValue::from_static(tag));
        res.headers_mut().insert(
            "x-path",
            HeaderValue::from_str(req.uri().path()).unwrap_or(HeaderValue::from_static("?")),
        );
        Ok(res)
    }

    fn h(tag: &'static str) -> impl Handler {
        move |req: Request<Body>| tagged(req, tag)
    }

    async fn handled_by(table: &RouteTable, req: Request<Body>) -> Option<String> {
        table.dispatch(req).await.unwrap().map(|res| {
            res.headers()["x-handler"].to_str().unwrap().to_string()
        })
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_method_route() {
        let table = RouteTable::builder()
            .route(method(Method::POST), h("h1"))
            .build()
            .unwrap();

        let post = Request::post("/").body(Body::empty()).unwrap();
        assert_eq!(handled_by(&table, post).await.as_deref(), Some("h1"));
        assert_eq!(handled_by(&table, get("/")).await, None);
    }

    #[tokio::test]
    async fn test_first_registered_wins() {
        let table = RouteTable::builder()
            .route(predicate::path("/a"), h("first"))
            .route(predicate::all(), h("second"))
            .build()
            .unwrap();

        assert_eq!(handled_by(&table, get("/a")).await.as_deref(), Some("first"));
        assert_eq!(handled_by(&table, get("/b")).await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_nest_precedence_at_registration_position() {
        let table = RouteTable::builder()
            .nest_path("/api", |api| {
                api.route(predicate::all(), h("nested"));
            })
            .route(predicate::path("/api/foo"), h("sibling"))
            .build()
            .unwrap();

        assert_eq!(handled_by(&table, get("/api/foo")).await.as_deref(), Some("nested"));
    }

    #[tokio::test]
    async fn test_nested_miss_falls_through() {
        let table = RouteTable::builder()
            .nest_path("/api", |api| {
                api.get("/foo/", h("nested"));
            })
            .route(predicate::path("/api/bar/"), h("sibling"))
            .build()
            .unwrap();

        assert_eq!(handled_by(&table, get("/api/bar/")).await.as_deref(), Some("sibling"));
        assert_eq!(handled_by(&table, get("/api/foo/")).await.as_deref(), Some("nested"));
        assert_eq!(handled_by(&table, get("/foo/")).await, None);
    }

    #[tokio::test]
    async fn test_compound_guard_strips_path_prefix() {
        let table = RouteTable::builder()
            .nest(method(Method::GET).and(predicate::path("/api")), |api| {
                api.get("/foo", h("nested"));
            })
            .build()
            .unwrap();

        assert_eq!(handled_by(&table, get("/api/foo")).await.as_deref(), Some("nested"));
        let post = Request::post("/api/foo").body(Body::empty()).unwrap();
        assert_eq!(handled_by(&table, post).await, None);
        assert_eq!(handled_by(&table, get("/foo")).await, None);
    }

    #[tokio::test]
    async fn test_header_guard_then_path_guard() {
        let table = RouteTable::builder()
            .nest(
                predicate::headers(|headers| headers.contains_key("x-tenant")).and(predicate::path("/t")),
                |tenant| {
                    tenant.nest_path("/v1", |v1| {
                        v1.get("/users", h("tenant-users"));
                    });
                },
            )
            .build()
            .unwrap();

        let req = Request::get("/t/v1/users")
            .header("x-tenant", "acme")
            .body(Body::empty())
            .unwrap();
        assert_eq!(handled_by(&table, req).await.as_deref(), Some("tenant-users"));
        assert_eq!(handled_by(&table, get("/t/v1/users")).await, None);
    }

    #[test]
    fn test_find_handler_is_pure() {
        let table = RouteTable::builder().get("/x", h("x")).build().unwrap();
        let req = get("/x");
        assert!(table.find_handler(&req).is_some());
        assert!(table.find_handler(&req).is_some());
        assert!(table.find_handler(&get("/y")).is_none());
    }

    #[test]
    fn test_table_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RouteTable>();
    }

    #[test]
    fn test_debug_lists_nodes() {
        let table = RouteTable::builder()
            .get("/a", h("a"))
            .resource_lookup(|_: &str| None)
            .build()
            .unwrap();
        let rendered = format!("{table:?}");
        assert!(rendered.contains("PathMatcher"), "{rendered}");
        assert!(rendered.contains("<resources>"), "{rendered}");
    }
}
