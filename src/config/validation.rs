//! Configuration validation.
//!
//! # Design Decisions
//! - Serde handles syntax; this module checks values
//! - Returns all validation errors, not just the first
//! - Pure function: CatalogConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::CatalogConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a parsed configuration.
pub fn validate_config(config: &CatalogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("server.request_timeout_secs"));
    }

    if config.storage.catalog_path.trim().is_empty() {
        errors.push(ValidationError::Empty("storage.catalog_path"));
    }

    if let Some(file) = &config.logging.file {
        if file.trim().is_empty() {
            errors.push(ValidationError::Empty("logging.file"));
        }
        if config.logging.max_bytes == 0 {
            errors.push(ValidationError::Zero("logging.max_bytes"));
        }
    }

    if config.tracing.service_name.trim().is_empty() {
        errors.push(ValidationError::Empty("tracing.service_name"));
    }
    if config.tracing.max_batch_size == 0 {
        errors.push(ValidationError::Zero("tracing.max_batch_size"));
    }
    if config.tracing.flush_interval_ms == 0 {
        errors.push(ValidationError::Zero("tracing.flush_interval_ms"));
    }

    if config.metrics.enabled && config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics.address",
            value: config.metrics.address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
