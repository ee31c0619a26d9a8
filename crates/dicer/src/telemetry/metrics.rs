//! HTTP server instruments recorded by the request instrumentation layer.

use std::time::Instant;

use axum::http::{Method, StatusCode};
use common::Route;
use opentelemetry::metrics::{Histogram, Meter, Unit, UpDownCounter};
use opentelemetry::KeyValue;
use opentelemetry_semantic_conventions::trace::{
    HTTP_REQUEST_METHOD, HTTP_RESPONSE_STATUS_CODE, HTTP_ROUTE,
};

pub const REQUEST_DURATION: &str = "http.server.request.duration";
pub const ACTIVE_REQUESTS: &str = "http.server.active_requests";

/// Request duration histogram plus an in-flight gauge.
#[derive(Clone)]
pub struct HttpServerMetrics {
    duration: Histogram<f64>,
    active: UpDownCounter<i64>,
}

impl HttpServerMetrics {
    pub fn new(meter: &Meter) -> Self {
        let duration = meter
            .f64_histogram(REQUEST_DURATION)
            .with_description("Duration of HTTP server requests.")
            .with_unit(Unit::new("s"))
            .init();
        let active = meter
            .i64_up_down_counter(ACTIVE_REQUESTS)
            .with_description("Number of active HTTP server requests.")
            .with_unit(Unit::new("{request}"))
            .init();
        Self { duration, active }
    }

    /// Mark a request as in flight. The returned guard decrements the gauge
    /// when dropped, whether or not [`InFlight::finish`] was called.
    pub fn start(&self, route: Route, method: &Method) -> InFlight<'_> {
        let attrs = vec![
            KeyValue::new(HTTP_ROUTE, route.path()),
            KeyValue::new(HTTP_REQUEST_METHOD, method.as_str().to_owned()),
        ];
        self.active.add(1, &attrs);
        InFlight {
            metrics: self,
            attrs,
            started: Instant::now(),
        }
    }
}

/// One request between [`HttpServerMetrics::start`] and its response.
pub struct InFlight<'a> {
    metrics: &'a HttpServerMetrics,
    attrs: Vec<KeyValue>,
    started: Instant,
}

impl InFlight<'_> {
    /// Record the duration sample for this request.
    pub fn finish(self, status: StatusCode) {
        let mut attrs = self.attrs.clone();
        attrs.push(KeyValue::new(
            HTTP_RESPONSE_STATUS_CODE,
            i64::from(status.as_u16()),
        ));
        self.metrics
            .duration
            .record(self.started.elapsed().as_secs_f64(), &attrs);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.metrics.active.add(-1, &self.attrs);
    }
}
