//! Functional HTTP request routing.
//!
//! Route tables are built from predicate/handler pairs, nested tables and
//! resource lookups, decorated with filters, hooks and error mappers, and
//! served over HTTP through axum.

pub mod app;
pub mod config;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::{HttpServer, RouterService};
pub use routing::{router, router_with, BuildError, Predicate, RouteTable, RouteTableBuilder};
