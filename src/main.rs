//! fnroute server.
//!
//! Serves a health route and the configured static resource directories
//! through a route table.
//!
//! ```text
//!     Client Request
//!         → http server (axum, trace + timeout layers)
//!         → route table (predicates, nested tables, resources)
//!         → handler (wrapped by filters, hooks, error mappers)
//!     Client Response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use fnroute::app::build_table;
use fnroute::config::{load_config, RouterConfig};
use fnroute::observability::{init_logging, init_metrics};
use fnroute::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "fnroute", version, about = "Serve a functional route table over HTTP")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;
    tracing::info!("fnroute v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        resources = config.resources.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(err) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %err,
                "Failed to parse metrics address"
            ),
        }
    }

    let table = build_table(&config)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(&config, table).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
