//! Per-route request instrumentation.
//!
//! Every route is wrapped by [`instrumented`], which layers, from the outside in:
//! 1. [`instrument`]: one server span per request, named by the route label and
//!    parented to any trace context the caller propagated, plus one duration
//!    sample on the HTTP server instruments.
//! 2. [`TimeoutLayer`]: a request running past the deadline becomes a `408`.
//! 3. [`CatchPanicLayer`]: a panicking handler becomes a `500`.
//!
//! Both failures surface as responses to [`instrument`], so the span still
//! closes, carries an `ERROR` status, and the duration sample is recorded.

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Request, State},
    handler::Handler,
    http::{header::USER_AGENT, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, MethodRouter},
};
use common::Route;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};
use tracing::{error, field::Empty, info_span, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::telemetry::Telemetry;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// State carried by one route's instrumentation layer.
#[derive(Clone)]
pub struct RouteTelemetry {
    pub telemetry: Telemetry,
    pub route: Route,
}

/// Mount `handler` for `GET` with instrumentation bound to `route`.
pub fn instrumented<H, T, S>(handler: H, route: Route, telemetry: &Telemetry) -> MethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    instrumented_with_timeout(handler, route, telemetry, REQUEST_TIMEOUT)
}

/// [`instrumented`] with an explicit request deadline.
pub fn instrumented_with_timeout<H, T, S>(
    handler: H,
    route: Route,
    telemetry: &Telemetry,
    timeout: Duration,
) -> MethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    let state = RouteTelemetry {
        telemetry: telemetry.clone(),
        route,
    };
    get(handler)
        .layer::<_, Infallible>(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(from_fn_with_state(state, instrument))
}

/// Open the request span, run the inner service, then close the span and
/// record the request's metrics.
pub async fn instrument(
    State(RouteTelemetry { telemetry, route }): State<RouteTelemetry>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let span = info_span!(
        "http_request",
        otel.name = route.label(),
        otel.kind = "server",
        otel.status_code = Empty,
        http.request.method = %method,
        http.route = route.path(),
        url.path = request.uri().path(),
        user_agent.original = Empty,
        http.response.status_code = Empty,
    );
    span.set_parent(telemetry.extract_context(request.headers()));
    if let Some(ua) = request.headers().get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        span.record("user_agent.original", ua);
    }

    let in_flight = telemetry.metrics().start(route, &method);
    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    span.record("http.response.status_code", status.as_u16());
    if is_failure(status) {
        span.record("otel.status_code", "ERROR");
        error!(parent: &span, status = status.as_u16(), route = route.label(), "request failed");
    }
    in_flight.finish(status);

    response
}

/// Server errors and our own deadline expiring count as failed requests.
fn is_failure(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT
}
