//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the catalog store, log sinks, and tracer provider from config
//! - Assemble the shared `Observability` and `CatalogService`
//! - Flush span export on shutdown
//!
//! # Design Decisions
//! - Fail fast: a sink that cannot be opened aborts startup
//! - Everything is built exactly once and shared by handle

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::operations::CatalogService;
use crate::catalog::store::{CatalogStore, JsonFileStore};
use crate::config::CatalogConfig;
use crate::observability::export;
use crate::observability::logging::{ConsoleSink, LogEmitter, LogSink, RotatingFileSink, SinkError};
use crate::observability::span::Tracer;
use crate::observability::Observability;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open request log {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: SinkError,
    },
}

/// Long-lived components shared by every request.
pub struct Services {
    pub catalog: CatalogService,
    pub observability: Arc<Observability>,
}

impl Services {
    /// Build services from configuration.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, StartupError> {
        let store: Arc<dyn CatalogStore> = Arc::new(JsonFileStore::new(&config.storage.catalog_path));
        let logger = build_logger(config)?;

        let tracer = Tracer::new(export::build_provider(&config.tracing));
        let observability = Arc::new(Observability::new(tracer, logger, store.clone()));

        tracing::info!(
            catalog = %config.storage.catalog_path,
            service_name = %config.tracing.service_name,
            span_export = config.tracing.enabled,
            "Catalog services initialized"
        );

        Ok(Self::from_parts(store, observability))
    }

    /// Assemble services from prebuilt parts.
    pub fn from_parts(store: Arc<dyn CatalogStore>, observability: Arc<Observability>) -> Self {
        Self {
            catalog: CatalogService::new(store, observability.clone()),
            observability,
        }
    }

    /// Deliver pending spans and stop the exporter.
    pub fn shutdown(&self) {
        self.observability.tracer().shutdown();
        tracing::info!("Span export stopped");
    }
}

fn build_logger(config: &CatalogConfig) -> Result<LogEmitter, StartupError> {
    let mut sinks: Vec<Box<dyn LogSink>> = Vec::new();

    if let Some(path) = &config.logging.file {
        let sink = RotatingFileSink::open(path, config.logging.max_bytes, config.logging.backup_count)
            .map_err(|source| StartupError::LogFile {
                path: PathBuf::from(path),
                source,
            })?;
        sinks.push(Box::new(sink));
    }
    if config.logging.console {
        sinks.push(Box::new(ConsoleSink));
    }

    Ok(LogEmitter::new(sinks))
}
