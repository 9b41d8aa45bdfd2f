//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that hands every request to the route table
//! - Wire up middleware (tracing, request timeout)
//! - Bind server to listener and shut down gracefully

use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RouterConfig;
use crate::http::service::RouterService;
use crate::routing::RouteTable;

/// HTTP server for a route table.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &RouterConfig, table: RouteTable) -> Self {
        Self {
            router: Self::build_router(config, RouterService::new(table)),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, service: RouterService) -> Router {
        Router::new()
            .fallback_service(service)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run until `signal` resolves, then drain in-flight requests.
    pub async fn run_until<S>(self, listener: TcpListener, signal: S) -> Result<(), std::io::Error>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "Failed to listen for Ctrl+C"),
    }
}
