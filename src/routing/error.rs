//! Route table construction errors.

use thiserror::Error;

use crate::routing::media::MediaTypeError;

/// Errors raised while building a route table.
///
/// All of these surface from `RouteTableBuilder::build`, never at request time.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The table (or one of its nested tables) has nothing to route to.
    #[error("route table has no routes, nested tables or resource lookups")]
    EmptyTable,

    /// A path pattern could not be compiled.
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    /// A media type in an accept/content-type predicate could not be parsed.
    #[error("invalid media type: {0}")]
    InvalidMediaType(#[from] MediaTypeError),
}
