//! Per-request observability.
//!
//! # Responsibilities
//! - Carry the request details every log record and span needs
//! - Translate an operation's outcome into one span with the shared
//!   attribute vocabulary
//! - Give operations a single handle for both logging and tracing
//!
//! # Design Decisions
//! - Constructed once at startup and shared via `Arc`; no global tracer or logger
//! - `record` opens exactly one span and never emits log records; operations
//!   log explicitly with the same event name and message
//! - `include_catalog_count` reads the whole catalog just to count it. The
//!   extra read is expected; a failing read becomes a span event, not an error

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::trace::{SpanKind, Status};

use crate::catalog::store::CatalogStore;
use crate::observability::logging::{LogEmitter, LogSeverity};
use crate::observability::metrics;
use crate::observability::span::Tracer;

/// Event added to a span when an operation succeeded with a warning.
pub const WARNING_EVENT: &str = "potential issue detected";

/// Read-only snapshot of the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: String,
    /// Absolute URL, including host and query.
    pub url: String,
    pub client_address: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        client_address: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            client_address: client_address.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// What to attach to the span opened by [`Observability::record`].
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub include_catalog_count: bool,
    pub course_code: Option<String>,
    pub error_message: Option<String>,
    pub warning_message: Option<String>,
    /// Timing attributes such as `validation.time`, reported in milliseconds.
    pub timings: Vec<(&'static str, Duration)>,
}

impl RecordOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog_count(mut self) -> Self {
        self.include_catalog_count = true;
        self
    }

    pub fn course_code(mut self, code: impl Into<String>) -> Self {
        self.course_code = Some(code.into());
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn warning(mut self, message: impl Into<String>) -> Self {
        self.warning_message = Some(message.into());
        self
    }

    pub fn timing(mut self, key: &'static str, elapsed: Duration) -> Self {
        self.timings.push((key, elapsed));
        self
    }
}

/// Logging and tracing for catalog operations.
pub struct Observability {
    tracer: Tracer,
    logger: LogEmitter,
    store: Arc<dyn CatalogStore>,
}

impl Observability {
    pub fn new(tracer: Tracer, logger: LogEmitter, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            tracer,
            logger,
            store,
        }
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Emit one request log record.
    pub fn log(&self, severity: LogSeverity, event: &str, context: &RequestContext, message: &str) {
        self.logger.emit(severity, event, context, message);
    }

    /// Open, annotate, and close one server span for `operation`.
    pub fn record(&self, operation: &str, context: &RequestContext, options: RecordOptions) {
        self.tracer
            .with_span(operation, SpanKind::Server, context, |span| {
                if options.include_catalog_count {
                    match self.store.list_courses() {
                        Ok(courses) => {
                            metrics::record_catalog_size(courses.len());
                            let count = i64::try_from(courses.len()).unwrap_or(i64::MAX);
                            span.set_attribute("courses.count", count);
                        }
                        Err(e) => {
                            tracing::warn!(operation = %operation, error = %e, "Catalog count unavailable");
                            span.add_event("catalog count unavailable", [("error", e.to_string())]);
                        }
                    }
                }

                if let Some(code) = &options.course_code {
                    span.set_attribute("course.code", code.clone());
                }

                for (key, elapsed) in &options.timings {
                    span.set_attribute(*key, elapsed.as_secs_f64() * 1000.0);
                }

                if let Some(message) = &options.warning_message {
                    span.set_attribute("warning.message", message.clone());
                    span.add_event(
                        WARNING_EVENT,
                        [
                            ("severity", "warning"),
                            ("details", "This is a potential issue, but the operation succeeded."),
                        ],
                    );
                }

                match &options.error_message {
                    Some(message) => {
                        span.set_attribute("error.message", message.clone());
                        span.set_status(Status::error(message.clone()));
                    }
                    None => span.set_status(Status::Ok),
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::Value;
    use opentelemetry_sdk::trace::InMemorySpanExporter;

    use crate::catalog::course::Course;
    use crate::catalog::store::{InMemoryStore, StoreError, StoreResult};
    use crate::observability::logging::MemorySink;
    use crate::observability::testing::{finished_spans, test_tracer, SpanDataExt};

    struct BrokenStore;

    impl CatalogStore for BrokenStore {
        fn list_courses(&self) -> StoreResult<Vec<Course>> {
            Err(StoreError::Io(std::io::Error::other("unreadable")))
        }
        fn append_course(&self, _course: Course) -> StoreResult<()> {
            Ok(())
        }
        fn remove_course(&self, _code: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn observability(store: Arc<dyn CatalogStore>) -> (Observability, InMemorySpanExporter, MemorySink) {
        let (tracer, exporter) = test_tracer();
        let sink = MemorySink::new();
        let obs = Observability::new(tracer, LogEmitter::new(vec![Box::new(sink.clone())]), store);
        (obs, exporter, sink)
    }

    fn context() -> RequestContext {
        RequestContext::new("GET", "http://localhost:5000/catalog", "127.0.0.1")
    }

    #[test]
    fn test_catalog_count() {
        let store = Arc::new(InMemoryStore::with_courses(vec![
            Course::new("CS101", "Intro", "Dr. X"),
            Course::new("MATH200", "Linear Algebra", "Dr. Z"),
        ]));
        let (obs, exporter, _) = observability(store);

        obs.record("render-course-catalog", &context(), RecordOptions::new().with_catalog_count());

        let span = &finished_spans(&exporter)[0];
        assert_eq!(span.attribute("courses.count"), Some(&Value::I64(2)));
        assert_eq!(span.status, Status::Ok);
    }

    #[test]
    fn test_count_failure_does_not_fail_record() {
        let (obs, exporter, _) = observability(Arc::new(BrokenStore));

        obs.record("render-course-catalog", &context(), RecordOptions::new().with_catalog_count());

        let span = &finished_spans(&exporter)[0];
        assert!(span.attribute("courses.count").is_none());
        assert!(span.event("catalog count unavailable").is_some());
        assert!(!span.is_error());
    }

    #[test]
    fn test_error_wins_over_warning() {
        let (obs, exporter, _) = observability(Arc::new(InMemoryStore::new()));

        obs.record(
            "add-course",
            &context(),
            RecordOptions::new()
                .course_code("CS101")
                .warning("Some fields are empty: semester")
                .error("Required fields are empty: name"),
        );

        let span = &finished_spans(&exporter)[0];
        assert_eq!(span.status, Status::error("Required fields are empty: name"));
        assert_eq!(
            span.attribute("error.message"),
            Some(&Value::from("Required fields are empty: name"))
        );
        assert_eq!(
            span.attribute("warning.message"),
            Some(&Value::from("Some fields are empty: semester"))
        );
        assert!(span.event(WARNING_EVENT).is_some());
    }

    #[test]
    fn test_warning_is_event_not_status() {
        let (obs, exporter, _) = observability(Arc::new(InMemoryStore::new()));

        obs.record("add-course", &context(), RecordOptions::new().warning("Some fields are empty"));

        let span = &finished_spans(&exporter)[0];
        assert_eq!(span.status, Status::Ok);
        let event = span.event(WARNING_EVENT).unwrap();
        assert!(event
            .attributes
            .iter()
            .any(|kv| kv.key.as_str() == "severity" && kv.value == Value::from("warning")));
    }

    #[test]
    fn test_record_does_not_log() {
        let (obs, exporter, sink) = observability(Arc::new(InMemoryStore::new()));

        obs.record("render-index", &context(), RecordOptions::new());
        assert_eq!(finished_spans(&exporter).len(), 1);
        assert!(sink.records().is_empty());

        obs.log(LogSeverity::Info, "render-index", &context(), "Home page rendered successfully");
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_timings_in_milliseconds() {
        let (obs, exporter, _) = observability(Arc::new(InMemoryStore::new()));

        obs.record(
            "add-course",
            &context(),
            RecordOptions::new().timing("save.time", Duration::from_millis(250)),
        );

        let span = &finished_spans(&exporter)[0];
        assert_eq!(span.attribute("save.time"), Some(&Value::F64(250.0)));
    }
}
