//! Request predicates: declarative conditions compiled into matchers.
//!
//! Predicates are plain values. They are composed with [`Predicate::and`],
//! [`Predicate::or`] and [`Predicate::negate`] and only compiled (patterns
//! parsed, media types validated) when a route table is built, so every
//! configuration mistake surfaces from `build()`.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, Method};

use crate::config::PathMatchingConfig;
use crate::routing::error::BuildError;
use crate::routing::matcher::{
    AcceptMatcher, AndMatcher, AnyMatcher, ContentTypeMatcher, CustomFn, CustomMatcher,
    Matcher, MethodMatcher, NotMatcher, OrMatcher, PathMatcher,
};
use crate::routing::media::MediaType;
use crate::routing::pattern::PathPattern;
use crate::routing::request::RouteRequest;

/// A boolean condition over a request.
#[derive(Clone)]
pub enum Predicate {
    /// Always true.
    Any,
    Method(Method),
    /// Path pattern, see [`PathPattern`].
    Path(String),
    /// Any acceptable media type is compatible with one of these.
    Accept(Vec<String>),
    /// One of these includes the request content type.
    ContentType(Vec<String>),
    Custom(CustomFn),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// Compile into a matcher, validating patterns and media types.
    pub fn compile(&self, options: PathMatchingConfig) -> Result<Box<dyn Matcher>, BuildError> {
        Ok(match self {
            Predicate::Any => Box::new(AnyMatcher),
            Predicate::Method(method) => Box::new(MethodMatcher::new(method.clone())),
            Predicate::Path(raw) => Box::new(PathMatcher::new(PathPattern::parse(raw, options)?)),
            Predicate::Accept(types) => Box::new(AcceptMatcher::new(parse_media_types(types)?)),
            Predicate::ContentType(types) => {
                Box::new(ContentTypeMatcher::new(parse_media_types(types)?))
            }
            Predicate::Custom(f) => Box::new(CustomMatcher::new(Arc::clone(f))),
            Predicate::And(..) => {
                let mut parts = Vec::new();
                self.flatten_and(&mut parts);
                let matchers = parts
                    .into_iter()
                    .map(|p| p.compile(options))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(AndMatcher::new(matchers))
            }
            Predicate::Or(..) => {
                let mut parts = Vec::new();
                self.flatten_or(&mut parts);
                let matchers = parts
                    .into_iter()
                    .map(|p| p.compile(options))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(OrMatcher::new(matchers))
            }
            Predicate::Not(inner) => Box::new(NotMatcher::new(inner.compile(options)?)),
        })
    }

    fn flatten_and<'p>(&'p self, out: &mut Vec<&'p Predicate>) {
        match self {
            Predicate::And(left, right) => {
                left.flatten_and(out);
                right.flatten_and(out);
            }
            other => out.push(other),
        }
    }

    fn flatten_or<'p>(&'p self, out: &mut Vec<&'p Predicate>) {
        match self {
            Predicate::Or(left, right) => {
                left.flatten_or(out);
                right.flatten_or(out);
            }
            other => out.push(other),
        }
    }
}

fn parse_media_types(types: &[String]) -> Result<Vec<MediaType>, BuildError> {
    types
        .iter()
        .map(|t| t.parse::<MediaType>().map_err(BuildError::from))
        .collect()
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Any => f.write_str("*"),
            Predicate::Method(method) => write!(f, "{method}"),
            Predicate::Path(pattern) => write!(f, "{pattern}"),
            Predicate::Accept(types) => write!(f, "Accept: {}", types.join(", ")),
            Predicate::ContentType(types) => write!(f, "Content-Type: {}", types.join(", ")),
            Predicate::Custom(_) => f.write_str("<custom>"),
            Predicate::And(left, right) => write!(f, "({left:?} && {right:?})"),
            Predicate::Or(left, right) => write!(f, "({left:?} || {right:?})"),
            Predicate::Not(inner) => write!(f, "!{inner:?}"),
        }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

/// Matches every request.
pub fn all() -> Predicate {
    Predicate::Any
}

pub fn method(method: Method) -> Predicate {
    Predicate::Method(method)
}

pub fn path(pattern: impl Into<String>) -> Predicate {
    Predicate::Path(pattern.into())
}

pub fn accept<I, S>(media_types: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::Accept(media_types.into_iter().map(Into::into).collect())
}

pub fn content_type<I, S>(media_types: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::ContentType(media_types.into_iter().map(Into::into).collect())
}

/// Condition on the request headers.
pub fn headers<F>(f: F) -> Predicate
where
    F: Fn(&HeaderMap) -> bool + Send + Sync + 'static,
{
    Predicate::Custom(Arc::new(move |req: &RouteRequest<'_>| f(req.headers())))
}

/// Condition on the whole request.
pub fn custom<F>(f: F) -> Predicate
where
    F: Fn(&RouteRequest<'_>) -> bool + Send + Sync + 'static,
{
    Predicate::Custom(Arc::new(f))
}

pub fn get(pattern: impl Into<String>) -> Predicate {
    method(Method::GET).and(path(pattern))
}

pub fn head(pattern: impl Into<String>) -> Predicate {
    method(Method::HEAD).and(path(pattern))
}

pub fn post(pattern: impl Into<String>) -> Predicate {
    method(Method::POST).and(path(pattern))
}

pub fn put(pattern: impl Into<String>) -> Predicate {
    method(Method::PUT).and(path(pattern))
}

pub fn patch(pattern: impl Into<String>) -> Predicate {
    method(Method::PATCH).and(path(pattern))
}

pub fn delete(pattern: impl Into<String>) -> Predicate {
    method(Method::DELETE).and(path(pattern))
}

pub fn options(pattern: impl Into<String>) -> Predicate {
    method(Method::OPTIONS).and(path(pattern))
}
