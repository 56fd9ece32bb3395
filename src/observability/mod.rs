//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Catalog operation classifies its outcome, then:
//!     → logging.rs (one structured record per event → file + console sinks)
//!     → context.rs (one span per operation, attributes + status)
//!         → span.rs (open, annotate, close exactly once)
//!         → export.rs (OpenTelemetry batch processor, off the request path)
//!     → metrics.rs (operation counters, latency, catalog size)
//! ```
//!
//! # Design Decisions
//! - Logs and spans for the same request share the event name and message
//! - Outcome classification happens before either channel is touched, so
//!   the two never disagree
//! - Everything hangs off one `Observability` value built at startup

pub mod context;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod span;
#[cfg(test)]
pub(crate) mod testing;

pub use context::{Observability, RecordOptions, RequestContext};
pub use export::{batch_provider, build_provider};
pub use logging::{ConsoleSink, LogEmitter, LogRecord, LogSeverity, LogSink, MemorySink, RotatingFileSink};
pub use span::{SpanCounters, SpanHandle, Tracer};
