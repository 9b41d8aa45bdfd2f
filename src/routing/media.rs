//! Media types for `Accept` and `Content-Type` matching.
//!
//! # Design Decisions
//! - Parameters (`charset`, `q`, ...) are parsed away and ignored for matching
//! - Parsing is delegated to `mime`; type and subtype are stored lowercase
//! - Structured-syntax suffixes (`+json`, `+xml`) participate in wildcard matching

use std::fmt;
use std::str::FromStr;

use mime_guess::mime::{self, Mime};
use thiserror::Error;

pub const ALL: &str = "*/*";
pub const APPLICATION_ATOM_XML: &str = "application/atom+xml";
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const APPLICATION_XML: &str = "application/xml";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";

/// Errors produced when parsing a media type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("media type is empty")]
    Empty,

    #[error("{value:?} is not a media type: {reason}")]
    Invalid { value: String, reason: String },

    #[error("{0:?} has a wildcard type with a concrete subtype")]
    WildcardType(String),
}

/// A `type/subtype` pair; parameters are dropped.
#[derive(Debug, Clone)]
pub struct MediaType {
    mime: Mime,
}

impl MediaType {
    /// The `*/*` media type.
    pub fn all() -> Self {
        Self {
            mime: mime::STAR_STAR,
        }
    }

    /// `application/octet-stream`, assumed when a request has no `Content-Type`.
    pub fn octet_stream() -> Self {
        Self {
            mime: mime::APPLICATION_OCTET_STREAM,
        }
    }

    pub fn main_type(&self) -> &str {
        self.mime.type_().as_str()
    }

    pub fn subtype(&self) -> &str {
        self.mime.subtype().as_str()
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.main_type() == "*"
    }

    /// True for `*` and for suffixed wildcards such as `*+json`.
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype() == "*" || self.subtype().starts_with("*+")
    }

    /// The structured-syntax suffix, e.g. `xml` for `atom+xml`.
    pub fn suffix(&self) -> Option<&str> {
        self.mime.suffix().map(|name| name.as_str())
    }

    fn split_suffix(&self) -> Option<(&str, &str)> {
        self.subtype().rsplit_once('+')
    }

    /// Whether this media type includes `other`.
    ///
    /// `text/*` includes `text/plain`, but not the other way around.
    pub fn includes(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() {
            return true;
        }
        if self.main_type() != other.main_type() {
            return false;
        }
        if self.subtype() == other.subtype() {
            return true;
        }
        if !self.is_wildcard_subtype() {
            return false;
        }
        match self.split_suffix() {
            None => true,
            Some((this_base, this_suffix)) => {
                this_base == "*"
                    && (other.suffix() == Some(this_suffix) || other.subtype() == this_suffix)
            }
        }
    }

    /// Symmetric compatibility: either side may contain wildcards.
    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() || other.is_wildcard_type() {
            return true;
        }
        if self.main_type() != other.main_type() {
            return false;
        }
        if self.subtype() == other.subtype() {
            return true;
        }
        if !self.is_wildcard_subtype() && !other.is_wildcard_subtype() {
            return false;
        }
        match (self.split_suffix(), other.split_suffix()) {
            (None, None) => true,
            (Some((this_base, this_suffix)), Some((other_base, other_suffix))) => {
                this_suffix == other_suffix && (this_base == "*" || other_base == "*")
            }
            (Some((this_base, this_suffix)), None) => {
                this_base == "*" && other.subtype() == this_suffix
            }
            (None, Some((other_base, other_suffix))) => {
                other_base == "*" && self.subtype() == other_suffix
            }
        }
    }

    /// Parse a comma separated header value, skipping entries that fail to parse.
    pub fn parse_list(value: &str) -> Vec<MediaType> {
        value
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .filter_map(|part| part.parse().ok())
            .collect()
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.mime.essence_str() == other.mime.essence_str()
    }
}

impl Eq for MediaType {}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| MediaTypeError::Invalid {
            value: s.to_string(),
            reason,
        };

        let essence = s.split(';').next().unwrap_or_default().trim();
        if essence.is_empty() {
            return Err(MediaTypeError::Empty);
        }
        // "*" is shorthand for "*/*".
        if essence == "*" {
            return Ok(Self::all());
        }
        if let Some(("*", sub)) = essence.split_once('/') {
            if sub.trim() != "*" {
                return Err(MediaTypeError::WildcardType(s.to_string()));
            }
        }

        // Parameters are dropped before parsing.
        let mime: Mime = essence
            .parse()
            .map_err(|e: mime::FromStrError| invalid(e.to_string()))?;
        if mime.subtype().as_str().is_empty() {
            return Err(invalid("missing subtype".to_string()));
        }
        Ok(Self { mime })
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime.essence_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mt(s: &str) -> MediaType {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_strips_parameters() {
        let json = mt("Application/JSON; charset=utf-8");
        assert_eq!(json.main_type(), "application");
        assert_eq!(json.subtype(), "json");
        assert_eq!(json.to_string(), APPLICATION_JSON);

        let atom = mt("application/atom+xml");
        assert_eq!(atom.suffix(), Some("xml"));
        assert_eq!(mt(APPLICATION_JSON).suffix(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<MediaType>(), Err(MediaTypeError::Empty));
        assert!(matches!(
            "json".parse::<MediaType>(),
            Err(MediaTypeError::Invalid { .. })
        ));
        assert!(matches!(
            "text/".parse::<MediaType>(),
            Err(MediaTypeError::Invalid { .. })
        ));
        assert!(matches!(
            "*/json".parse::<MediaType>(),
            Err(MediaTypeError::WildcardType(_))
        ));
        assert_eq!(mt("*"), MediaType::all());
    }

    #[test]
    fn test_includes() {
        assert!(mt("*/*").includes(&mt("text/plain")));
        assert!(mt("text/*").includes(&mt("text/plain")));
        assert!(!mt("text/plain").includes(&mt("text/*")));
        assert!(mt("application/*+xml").includes(&mt("application/atom+xml")));
        assert!(mt("application/*+xml").includes(&mt("application/xml")));
        assert!(!mt("application/*+xml").includes(&mt("application/json")));
        assert!(!mt("application/json").includes(&mt("application/pdf")));
    }

    #[test]
    fn test_compatible_is_symmetric() {
        assert!(mt("text/plain").is_compatible_with(&mt("text/*")));
        assert!(mt("text/*").is_compatible_with(&mt("text/plain")));
        assert!(mt("application/atom+xml").is_compatible_with(&mt("application/*+xml")));
        assert!(!mt("application/pdf").is_compatible_with(&mt("application/json")));
        assert!(!mt("text/plain").is_compatible_with(&mt("application/json")));
    }

    #[test]
    fn test_parse_list_skips_garbage() {
        let list = MediaType::parse_list("application/json, bogus, text/html ;q=0.8,");
        assert_eq!(list, vec![mt(APPLICATION_JSON), mt(TEXT_HTML)]);
    }
}
