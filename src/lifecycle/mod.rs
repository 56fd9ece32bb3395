//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build store, sinks, exporter → Assemble services
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C / SIGTERM / trigger → Stop accepting → Drain → Flush spans → Exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{Services, StartupError};
