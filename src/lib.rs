//! Course catalog service with correlated request logs and traces.

pub mod catalog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use catalog::{CatalogService, Course};
pub use config::CatalogConfig;
pub use http::HttpServer;
pub use lifecycle::{Services, Shutdown};
pub use observability::{Observability, RequestContext};
