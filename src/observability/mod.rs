//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing and HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LoggingError};
pub use metrics::{init_metrics, record_dispatch, DispatchOutcome};
