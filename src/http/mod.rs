//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing and timeout layers)
//!     → service.rs (route table dispatch)
//!     → 404 on no match, 500 on unhandled handler error
//!     → Send to client
//! ```

pub mod server;
pub mod service;

pub use server::HttpServer;
pub use service::RouterService;
