//! Compiled request matchers.
//!
//! # Responsibilities
//! - Match method (exact verb)
//! - Match path (segment-anchored glob)
//! - Match `Accept` / `Content-Type` against media types
//! - Combine conditions with AND / OR / NOT semantics
//!
//! # Design Decisions
//! - Matchers are immutable and shared across requests
//! - Combinators short-circuit left to right
//! - No regex to guarantee linear matching per pattern segment

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::media::MediaType;
use crate::routing::pattern::PathPattern;
use crate::routing::request::RouteRequest;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &RouteRequest<'_>) -> bool;

    /// The request a nested table sees when this matcher guards it, or `None`
    /// if the table is not entered.
    ///
    /// Path matchers consume their prefix; everything else passes the request
    /// through unchanged.
    fn nest<'a>(&self, req: &RouteRequest<'a>) -> Option<RouteRequest<'a>> {
        self.matches(req).then_some(*req)
    }
}

/// Matches every request.
#[derive(Debug, Clone, Copy)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _req: &RouteRequest<'_>) -> bool {
        true
    }
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        *req.method() == self.method
    }
}

/// Matches the routing path against a pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: PathPattern,
}

impl PathMatcher {
    pub fn new(pattern: PathPattern) -> Self {
        Self { pattern }
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        let matched = self.pattern.matches(req.path());
        tracing::trace!(pattern = %self.pattern, path = req.path(), matched, "path predicate");
        matched
    }

    fn nest<'a>(&self, req: &RouteRequest<'a>) -> Option<RouteRequest<'a>> {
        let rest = self.pattern.match_start(req.path())?;
        tracing::trace!(pattern = %self.pattern, path = req.path(), rest, "path prefix");
        Some(req.with_path(rest))
    }
}

/// Matches when any acceptable media type is compatible with any target type.
#[derive(Debug, Clone)]
pub struct AcceptMatcher {
    media_types: Vec<MediaType>,
}

impl AcceptMatcher {
    pub fn new(media_types: Vec<MediaType>) -> Self {
        Self { media_types }
    }
}

impl Matcher for AcceptMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        let mut accepted = req.accept();
        if accepted.is_empty() {
            accepted.push(MediaType::all());
        }
        self.media_types
            .iter()
            .any(|target| accepted.iter().any(|acc| acc.is_compatible_with(target)))
    }
}

/// Matches when a target media type includes the request content type.
///
/// A request without `Content-Type` is treated as `application/octet-stream`.
#[derive(Debug, Clone)]
pub struct ContentTypeMatcher {
    media_types: Vec<MediaType>,
}

impl ContentTypeMatcher {
    pub fn new(media_types: Vec<MediaType>) -> Self {
        Self { media_types }
    }
}

impl Matcher for ContentTypeMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        let content_type = req.content_type().unwrap_or_else(MediaType::octet_stream);
        self.media_types
            .iter()
            .any(|target| target.includes(&content_type))
    }
}

/// Caller-supplied predicate function.
pub type CustomFn = Arc<dyn Fn(&RouteRequest<'_>) -> bool + Send + Sync>;

/// Matches with a caller-supplied function.
#[derive(Clone)]
pub struct CustomMatcher {
    f: CustomFn,
}

impl CustomMatcher {
    pub fn new(f: CustomFn) -> Self {
        Self { f }
    }
}

impl fmt::Debug for CustomMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomMatcher")
    }
}

impl Matcher for CustomMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        (self.f)(req)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }

    // Each condition sees the request as narrowed by the ones before it.
    fn nest<'a>(&self, req: &RouteRequest<'a>) -> Option<RouteRequest<'a>> {
        self.matchers
            .iter()
            .try_fold(*req, |narrowed, m| m.nest(&narrowed))
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct OrMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl OrMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for OrMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches(req))
    }

    fn nest<'a>(&self, req: &RouteRequest<'a>) -> Option<RouteRequest<'a>> {
        self.matchers.iter().find_map(|m| m.nest(req))
    }
}

/// Inverts another matcher.
#[derive(Debug)]
pub struct NotMatcher {
    inner: Box<dyn Matcher>,
}

impl NotMatcher {
    pub fn new(inner: Box<dyn Matcher>) -> Self {
        Self { inner }
    }
}

impl Matcher for NotMatcher {
    fn matches(&self, req: &RouteRequest<'_>) -> bool {
        !self.inner.matches(req)
    }
}
