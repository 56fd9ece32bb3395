//! Span capture for unit tests.

use opentelemetry::trace::Event;
use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, InMemorySpanExporterBuilder, SdkTracerProvider, SpanData};

use crate::observability::span::Tracer;

/// Tracer whose spans land in memory as soon as they end. Captured spans
/// outlive the tracer.
pub(crate) fn test_tracer() -> (Tracer, InMemorySpanExporter) {
    let exporter = InMemorySpanExporterBuilder::new()
        .keep_records_on_shutdown()
        .build();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (Tracer::new(provider), exporter)
}

pub(crate) fn finished_spans(exporter: &InMemorySpanExporter) -> Vec<SpanData> {
    exporter.get_finished_spans().unwrap()
}

pub(crate) fn spans_named(exporter: &InMemorySpanExporter, name: &str) -> Vec<SpanData> {
    finished_spans(exporter)
        .into_iter()
        .filter(|s| s.name == name)
        .collect()
}

pub(crate) trait SpanDataExt {
    fn attribute(&self, key: &str) -> Option<&Value>;
    fn event(&self, name: &str) -> Option<&Event>;
    fn is_error(&self) -> bool;
}

impl SpanDataExt for SpanData {
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .rev()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    fn is_error(&self) -> bool {
        matches!(self.status, opentelemetry::trace::Status::Error { .. })
    }
}
