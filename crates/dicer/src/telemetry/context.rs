//! The process-wide telemetry context handed to the HTTP layer.

use std::sync::Arc;

use axum::http::HeaderMap;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::propagation::{Extractor, TextMapCompositePropagator, TextMapPropagator};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use tracing::warn;

use super::init::SERVICE_NAME;
use super::metrics::HttpServerMetrics;

/// W3C trace-context followed by W3C baggage.
pub fn propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

/// Telemetry state shared by every instrumented route.
///
/// Built once by [`init_telemetry`](super::init_telemetry) and cloned into
/// each route's instrumentation layer. Clones share the same instruments.
#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<Inner>,
}

struct Inner {
    propagator: TextMapCompositePropagator,
    metrics: HttpServerMetrics,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    /// Create the context on top of an already configured meter provider.
    pub fn new(meter_provider: SdkMeterProvider) -> Self {
        let meter = meter_provider.meter(SERVICE_NAME);
        Self {
            inner: Arc::new(Inner {
                propagator: propagator(),
                metrics: HttpServerMetrics::new(&meter),
                meter_provider,
            }),
        }
    }

    pub fn metrics(&self) -> &HttpServerMetrics {
        &self.inner.metrics
    }

    /// Extract the caller's trace context and baggage from request headers.
    ///
    /// Returns a context with no remote parent when the headers carry none.
    pub fn extract_context(&self, headers: &HeaderMap) -> opentelemetry::Context {
        self.inner.propagator.extract(&HeaderExtractor(headers))
    }

    /// Flush and stop both export pipelines. Blocks until pending data is
    /// handed to the exporters; call it off the async executor.
    pub fn shutdown(&self) {
        if let Err(e) = self.inner.meter_provider.shutdown() {
            warn!(error = %e, "failed to shut down meter provider");
        }
        opentelemetry::global::shutdown_tracer_provider();
    }
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
