//! Course catalog service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──▶ http (axum router, request id, RequestContext)
//!                 │
//!                 ▼
//!               catalog::operations ──▶ catalog::validator
//!                 │            │
//!                 │            └──────▶ catalog::store (JSON file)
//!                 ▼
//!               observability
//!                 ├─ logging  ──▶ rotating file + console
//!                 ├─ span     ──▶ export (OpenTelemetry batch) ──▶ stdout
//!                 └─ metrics  ──▶ Prometheus endpoint
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_catalog::config::{load_config, CatalogConfig};
use course_catalog::http::{HandlebarsRenderer, HttpServer};
use course_catalog::lifecycle::{Services, Shutdown};
use course_catalog::observability::metrics;

#[derive(Parser)]
#[command(name = "course-catalog")]
#[command(about = "Course catalog web service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CatalogConfig::default(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("course-catalog v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        catalog = %config.storage.catalog_path,
        request_log = ?config.logging.file,
        "Configuration loaded"
    );

    if config.metrics.enabled {
        match config.metrics.address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.metrics.address,
                "Failed to parse metrics address"
            ),
        }
    }

    let services = Services::from_config(&config)?;
    let renderer = Arc::new(HandlebarsRenderer::new()?);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config.server, services.catalog.clone(), renderer);
    server.run(listener, shutdown.subscribe()).await?;

    services.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
