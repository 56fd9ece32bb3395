//! Span export pipeline.
//!
//! # Responsibilities
//! - Build the tracer provider the catalog tracer runs on
//! - Deliver finished spans off the request path
//!
//! # Design Decisions
//! - Export uses the SDK's batch span processor; batch size and flush
//!   interval come from config
//! - Finished spans go to stdout; with export disabled the provider has no
//!   processors and spans are dropped as they end

use std::time::Duration;

use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, SdkTracerProvider, SpanExporter};
use opentelemetry_sdk::Resource;

use crate::config::TracingConfig;

fn resource(service_name: &str) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .build()
}

/// Provider for the configured export mode.
pub fn build_provider(config: &TracingConfig) -> SdkTracerProvider {
    if config.enabled {
        batch_provider(config, opentelemetry_stdout::SpanExporter::default())
    } else {
        SdkTracerProvider::builder()
            .with_resource(resource(&config.service_name))
            .build()
    }
}

/// Provider that batches finished spans into `exporter`.
pub fn batch_provider<E>(config: &TracingConfig, exporter: E) -> SdkTracerProvider
where
    E: SpanExporter + 'static,
{
    let batch_config = BatchConfigBuilder::default()
        .with_max_export_batch_size(config.max_batch_size)
        .with_scheduled_delay(Duration::from_millis(config.flush_interval_ms))
        .build();
    let processor = BatchSpanProcessor::builder(exporter)
        .with_batch_config(batch_config)
        .build();

    SdkTracerProvider::builder()
        .with_resource(resource(&config.service_name))
        .with_span_processor(processor)
        .build()
}
