//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CatalogConfig (validated, immutable)
//!     → consumed once at startup to build the service
//! ```
//!
//! # Design Decisions
//! - Config is read once; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CatalogConfig, LoggingConfig, MetricsConfig, ServerConfig, StorageConfig, TracingConfig};
