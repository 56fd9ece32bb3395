//! Trace spans for catalog operations.
//!
//! # Responsibilities
//! - Open an OpenTelemetry span per unit of work with request-context attributes
//! - Let the traced block add attributes, events, and a status
//! - End the span exactly once
//!
//! # Design Decisions
//! - Ending is tied to a guard's `Drop`, so early returns, `?`, and panics
//!   inside the traced block still end the span
//! - Status is held on the handle and applied when the span ends. Error is
//!   sticky: once set, a later `Ok` is ignored
//! - Warnings are events, never a status
//! - A `tracing` span mirrors each catalog span while the block runs, so
//!   diagnostics emitted inside it carry the same trace and span ids

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use opentelemetry::trace::{Span as _, SpanKind, Status, Tracer as _, TracerProvider as _};
use opentelemetry::{Key, KeyValue, Value};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, Span};

use crate::observability::context::RequestContext;

/// Instrumentation scope reported on every span.
const INSTRUMENTATION_NAME: &str = "course-catalog";

fn kind_label(kind: &SpanKind) -> &'static str {
    match kind {
        SpanKind::Server => "server",
        SpanKind::Internal => "internal",
        _ => "other",
    }
}

fn status_label(status: &Status) -> &'static str {
    if matches!(status, Status::Error { .. }) {
        "error"
    } else if *status == Status::Ok {
        "ok"
    } else {
        "unset"
    }
}

/// Mutable view of an open span, passed to the traced block.
pub struct SpanHandle {
    span: Span,
    status: Status,
}

impl SpanHandle {
    pub fn set_attribute(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    pub fn add_event<K, V>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        payload: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<Key>,
        V: Into<Value>,
    {
        let attributes = payload
            .into_iter()
            .map(|(k, v)| KeyValue::new(k, v))
            .collect();
        self.span.add_event(name, attributes);
    }

    /// Set the terminal status. An existing error status is never downgraded.
    pub fn set_status(&mut self, status: Status) {
        let downgrade = matches!(self.status, Status::Error { .. }) && status == Status::Ok;
        if status == Status::Unset || downgrade {
            return;
        }
        self.status = status;
    }
}

/// Open/close tallies for every span a tracer has produced.
#[derive(Debug, Default)]
pub struct SpanCounters {
    opened: AtomicU64,
    closed: AtomicU64,
}

impl SpanCounters {
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Builds catalog spans on an OpenTelemetry tracer provider.
#[derive(Clone)]
pub struct Tracer {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
    counters: Arc<SpanCounters>,
}

impl Tracer {
    pub fn new(provider: SdkTracerProvider) -> Self {
        let tracer = provider.tracer(INSTRUMENTATION_NAME);
        Self {
            provider,
            tracer,
            counters: Arc::new(SpanCounters::default()),
        }
    }

    pub fn counters(&self) -> &SpanCounters {
        &self.counters
    }

    /// Export anything still queued and stop the provider's processors.
    pub fn shutdown(&self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Span export shutdown failed");
        }
    }

    /// Run `f` inside a new span and return its result.
    ///
    /// `http.method`, `http.url`, and `user.ip` are taken from `context`
    /// before `f` runs. The span ends when `f` returns or unwinds.
    pub fn with_span<R>(
        &self,
        name: &str,
        kind: SpanKind,
        context: &RequestContext,
        f: impl FnOnce(&mut SpanHandle) -> R,
    ) -> R {
        let mut guard = self.start_span(name, kind, context);
        let _entered = guard.mirror.clone().entered();
        f(&mut guard.handle)
    }

    fn start_span(&self, name: &str, kind: SpanKind, context: &RequestContext) -> SpanGuard<'_> {
        let mut attributes = vec![
            KeyValue::new("http.method", context.method.clone()),
            KeyValue::new("http.url", context.url.clone()),
            KeyValue::new("user.ip", context.client_address.clone()),
        ];
        if let Some(request_id) = &context.request_id {
            attributes.push(KeyValue::new("http.request_id", request_id.clone()));
        }

        let span = self
            .tracer
            .span_builder(name.to_string())
            .with_kind(kind.clone())
            .with_attributes(attributes)
            .start(&self.tracer);

        let span_context = span.span_context().clone();
        let mirror = tracing::info_span!(
            "catalog_span",
            otel.name = %name,
            otel.kind = kind_label(&kind),
            trace_id = %span_context.trace_id(),
            span_id = %span_context.span_id(),
            otel.status_code = tracing::field::Empty,
        );

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        SpanGuard {
            tracer: self,
            name: name.to_string(),
            handle: SpanHandle {
                span,
                status: Status::Unset,
            },
            mirror,
        }
    }
}

/// Ends its span when dropped.
struct SpanGuard<'a> {
    tracer: &'a Tracer,
    name: String,
    handle: SpanHandle,
    mirror: tracing::Span,
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        let status = self.handle.status.clone();
        self.mirror.record("otel.status_code", status_label(&status));
        if std::thread::panicking() && !matches!(status, Status::Error { .. }) {
            tracing::warn!(span = %self.name, "Span closed while unwinding");
        }

        self.handle.span.set_status(status);
        self.handle.span.end();
        self.tracer.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::testing::{finished_spans, test_tracer, SpanDataExt};

    fn context() -> RequestContext {
        RequestContext::new("GET", "http://localhost:5000/catalog", "10.0.0.7")
    }

    #[test]
    fn test_baseline_attributes() {
        let (tracer, exporter) = test_tracer();

        tracer.with_span("render-course-catalog", SpanKind::Server, &context(), |_| {});

        let spans = finished_spans(&exporter);
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.name, "render-course-catalog");
        assert_eq!(span.span_kind, SpanKind::Server);
        assert_eq!(span.attribute("http.method"), Some(&Value::from("GET")));
        assert_eq!(
            span.attribute("http.url"),
            Some(&Value::from("http://localhost:5000/catalog"))
        );
        assert_eq!(span.attribute("user.ip"), Some(&Value::from("10.0.0.7")));
        assert_eq!(span.status, Status::Unset);
        assert!(span.span_context.is_valid());
    }

    #[test]
    fn test_returns_block_result() {
        let (tracer, _exporter) = test_tracer();
        let value = tracer.with_span("compute", SpanKind::Internal, &context(), |span| {
            span.set_attribute("answer", 42i64);
            42
        });
        assert_eq!(value, 42);
    }

    #[test]
    fn test_closes_on_error_return() {
        let (tracer, exporter) = test_tracer();

        let result: Result<(), String> = tracer.with_span("failing", SpanKind::Server, &context(), |span| {
            span.set_status(Status::error("boom"));
            Err("boom".to_string())
        });

        assert!(result.is_err());
        let spans = finished_spans(&exporter);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].status, Status::error("boom"));
    }

    #[test]
    fn test_closes_on_panic() {
        let (tracer, exporter) = test_tracer();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tracer.with_span("panicking", SpanKind::Server, &context(), |span| {
                span.add_event("about to fail", [("step", 1i64)]);
                panic!("store exploded");
            })
        }));

        assert!(result.is_err());
        let spans = finished_spans(&exporter);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].status, Status::Unset);
        assert!(spans[0].event("about to fail").is_some());
        assert_eq!(tracer.counters().opened(), tracer.counters().closed());
    }

    #[test]
    fn test_open_close_counts_balance() {
        let (tracer, exporter) = test_tracer();

        for i in 0..5 {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                tracer.with_span("op", SpanKind::Server, &context(), |_| {
                    if i % 2 == 0 {
                        panic!("even");
                    }
                })
            }));
        }

        assert_eq!(tracer.counters().opened(), 5);
        assert_eq!(tracer.counters().closed(), 5);
        assert_eq!(finished_spans(&exporter).len(), 5);
    }

    #[test]
    fn test_error_status_is_sticky() {
        let (tracer, exporter) = test_tracer();

        tracer.with_span("add-course", SpanKind::Server, &context(), |span| {
            span.set_status(Status::error("Required fields are empty"));
            span.add_event("potential issue detected", [("severity", "warning")]);
            span.set_status(Status::Ok);
        });

        assert_eq!(
            finished_spans(&exporter)[0].status,
            Status::error("Required fields are empty")
        );
    }

    #[test]
    fn test_error_replaces_ok() {
        let (tracer, exporter) = test_tracer();

        tracer.with_span("delete-course", SpanKind::Server, &context(), |span| {
            span.set_status(Status::Ok);
            span.set_status(Status::error("disk full"));
        });

        assert_eq!(finished_spans(&exporter)[0].status, Status::error("disk full"));
    }

    #[test]
    fn test_request_id_attribute() {
        let (tracer, exporter) = test_tracer();
        let context = context().with_request_id("req-1");

        tracer.with_span("render-index", SpanKind::Server, &context, |_| {});

        assert_eq!(
            finished_spans(&exporter)[0].attribute("http.request_id"),
            Some(&Value::from("req-1"))
        );
    }
}
