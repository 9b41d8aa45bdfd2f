//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Table Construction:
//!     RouteTableBuilder (routes, nests, resources, interceptors)
//!     → predicate.rs (compile predicates into matchers)
//!     → pattern.rs / media.rs (parse path patterns and media types)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path, headers)
//!     → router.rs (walk nodes in registration order)
//!     → matcher.rs (evaluate match conditions)
//!     → filter.rs (wrap the match with the interceptors of each table on the way out)
//!     → Return: handler or no-match
//! ```
//!
//! # Design Decisions
//! - Tables compiled at build time, immutable at runtime
//! - No regex in the hot path
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod builder;
pub mod error;
pub mod filter;
pub mod handler;
pub mod matcher;
pub mod media;
pub mod pattern;
pub mod predicate;
pub mod request;
pub mod resources;
pub mod router;

pub use builder::{router, router_with, RouteTableBuilder};
pub use error::BuildError;
pub use filter::{ErrorMapper, Filter, Next};
pub use handler::{BoxError, BoxHandler, Handler, HandlerFuture, HandlerResult};
pub use media::{MediaType, MediaTypeError};
pub use pattern::PathPattern;
pub use predicate::Predicate;
pub use request::RouteRequest;
pub use resources::{PathResources, Resource, ResourceLookup};
pub use router::RouteTable;
