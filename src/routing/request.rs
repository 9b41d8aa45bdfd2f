//! Borrowed request view used during matching.
//!
//! # Responsibilities
//! - Expose routing-relevant information (method, path, headers)
//! - Carry the routing path, which shrinks as nested tables strip prefixes
//! - Derive `Accept` and `Content-Type` media types from headers

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request};

use crate::routing::media::MediaType;

/// A request as seen by predicates.
///
/// Inside a table nested under `/api`, [`path`](Self::path) for `/api/foo/`
/// is `/foo/` while [`full_path`](Self::full_path) stays `/api/foo/`.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    inner: &'a Request<Body>,
    path: &'a str,
}

impl<'a> RouteRequest<'a> {
    pub fn new(inner: &'a Request<Body>) -> Self {
        Self {
            inner,
            path: inner.uri().path(),
        }
    }

    pub(crate) fn with_path(&self, path: &'a str) -> Self {
        Self {
            inner: self.inner,
            path,
        }
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// The path still to be matched at this nesting level.
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn full_path(&self) -> &'a str {
        self.inner.uri().path()
    }

    pub fn headers(&self) -> &'a HeaderMap {
        self.inner.headers()
    }

    /// All values of a header, in the order they were sent.
    pub fn header(&self, name: &str) -> Vec<&'a str> {
        self.inner
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Acceptable media types; empty when no usable `Accept` header was sent.
    pub fn accept(&self) -> Vec<MediaType> {
        self.header(header::ACCEPT.as_str())
            .into_iter()
            .flat_map(MediaType::parse_list)
            .collect()
    }

    pub fn content_type(&self) -> Option<MediaType> {
        self.inner
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    pub fn inner(&self) -> &'a Request<Body> {
        self.inner
    }
}
