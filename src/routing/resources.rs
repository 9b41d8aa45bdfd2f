//! Resource lookup and serving.
//!
//! # Responsibilities
//! - Resolve a routing path to a resource, or signal absence
//! - Serve a resolved resource for GET/HEAD, answer OPTIONS, reject the rest
//!
//! # Design Decisions
//! - Lookup is synchronous and only checks existence; bytes are read when served
//! - Paths containing `..`, backslashes or drive separators never resolve
//! - Content type is guessed from the file extension with `mime_guess`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::PathMatchingConfig;
use crate::routing::error::BuildError;
use crate::routing::handler::{BoxHandler, HandlerResult};
use crate::routing::media::APPLICATION_OCTET_STREAM;
use crate::routing::pattern::PathPattern;

const ALLOWED: &str = "GET, HEAD, OPTIONS";

/// Something a resource lookup can hand back.
#[derive(Debug, Clone)]
pub enum Resource {
    /// A file, read when the request is served.
    File(PathBuf),
    /// In-memory content.
    Bytes {
        body: Bytes,
        content_type: Option<String>,
    },
}

impl Resource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Resource::File(path.into())
    }

    pub fn bytes(body: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        Resource::Bytes {
            body: body.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    fn content_type(&self) -> String {
        match self {
            Resource::File(path) => guess_content_type(path),
            Resource::Bytes { content_type, .. } => content_type
                .clone()
                .unwrap_or_else(|| APPLICATION_OCTET_STREAM.to_string()),
        }
    }

    async fn load(&self) -> std::io::Result<Bytes> {
        match self {
            Resource::File(path) => tokio::fs::read(path).await.map(Bytes::from),
            Resource::Bytes { body, .. } => Ok(body.clone()),
        }
    }
}

/// Maps a routing path to a resource.
///
/// Lookups run inline on the dispatch path, while the table is searched, so
/// they should be cheap. [`PathResources`] does one blocking metadata call per
/// candidate; anything slower belongs in the served resource, not the lookup.
pub trait ResourceLookup: Send + Sync + 'static {
    fn lookup(&self, path: &str) -> Option<Resource>;
}

impl<F> ResourceLookup for F
where
    F: Fn(&str) -> Option<Resource> + Send + Sync + 'static,
{
    fn lookup(&self, path: &str) -> Option<Resource> {
        self(path)
    }
}

/// Files under `location`, exposed at the part of the path matched by `pattern`.
///
/// `PathResources` for `/static/**` and `./public` resolves `/static/css/site.css`
/// to `./public/css/site.css` if that file exists.
#[derive(Debug, Clone)]
pub struct PathResources {
    pattern: PathPattern,
    location: PathBuf,
}

impl PathResources {
    pub fn new(
        pattern: &str,
        location: impl Into<PathBuf>,
        options: PathMatchingConfig,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            pattern: PathPattern::parse(pattern, options)?,
            location: location.into(),
        })
    }
}

impl ResourceLookup for PathResources {
    fn lookup(&self, path: &str) -> Option<Resource> {
        let relative = self.pattern.extract_path_within(path)?;
        if relative.is_empty() || is_invalid_path(&relative) {
            return None;
        }
        let candidate = self.location.join(&relative);
        // Blocking stat; reading the bytes happens later on tokio::fs.
        if candidate.is_file() {
            tracing::trace!(path, file = %candidate.display(), "resource resolved");
            Some(Resource::File(candidate))
        } else {
            None
        }
    }
}

fn is_invalid_path(relative: &str) -> bool {
    relative.contains('\\')
        || relative.contains(':')
        || relative.starts_with('/')
        || relative.split('/').any(|seg| seg == "..")
}

fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Handler serving a resolved resource.
pub(crate) fn resource_handler(resource: Resource) -> BoxHandler {
    let resource = Arc::new(resource);
    Arc::new(move |req: Request<Body>| serve(Arc::clone(&resource), req))
}

async fn serve(resource: Arc<Resource>, req: Request<Body>) -> HandlerResult {
    let method = req.method().clone();
    if method == Method::OPTIONS {
        return Ok((
            StatusCode::OK,
            [(header::ALLOW, HeaderValue::from_static(ALLOWED))],
        )
            .into_response());
    }
    if method != Method::GET && method != Method::HEAD {
        return Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, HeaderValue::from_static(ALLOWED))],
        )
            .into_response());
    }

    let body = resource.load().await?;
    let len = body.len();
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(body)
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resource.content_type())
        .header(header::CONTENT_LENGTH, len)
        .body(body)?;
    Ok(response)
}
