//! OTEL SDK initialisation: tracing subscriber + OTLP trace and metric exporters.

use anyhow::{Context, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::Tracer, Resource};
use opentelemetry_semantic_conventions::{resource, SCHEMA_URL};
use tracing::{info, Level};
use tracing_subscriber::{
    filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::context::{self, Telemetry};
use crate::config::{Config, OtlpEndpoint, METRICS_ENDPOINT_VAR, TRACES_ENDPOINT_VAR};

pub const SERVICE_NAME: &str = "dicer";
pub const SERVICE_NAMESPACE: &str = "manual";

/// Initialise the global tracing subscriber and both OTEL pipelines.
///
/// Configures:
/// - A batching OTLP span exporter targeting the traces endpoint.
/// - A periodic OTLP metric exporter targeting the metrics endpoint.
/// - The W3C trace-context + baggage propagator.
/// - A JSON-formatted [`tracing_subscriber`] layer for structured log output,
///   plus a [`tracing_opentelemetry`] layer that turns request spans into OTEL spans.
///
/// Both channels are plaintext gRPC and connect lazily, so an unreachable
/// collector does not fail startup.
///
/// # Errors
///
/// Returns an error if either exporter or the subscriber cannot be initialised.
pub fn init_telemetry(cfg: &Config) -> Result<Telemetry> {
    let traces = cfg.traces_endpoint()?;
    let metrics = cfg.metrics_endpoint()?;

    let tracer = install_tracer(&traces)?;

    let meter_provider = opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(metrics.grpc_target()),
        )
        .with_resource(service_resource())
        .with_period(cfg.metric_export_interval())
        .build()
        .context("failed to build OTLP metrics pipeline")?;

    global::set_text_map_propagator(context::propagator());
    global::set_meter_provider(meter_provider.clone());

    init_subscriber(tracer, &cfg.log_level)?;
    for (var, endpoint) in [(TRACES_ENDPOINT_VAR, &traces), (METRICS_ENDPOINT_VAR, &metrics)] {
        info!(
            endpoint = %endpoint,
            host = endpoint.host(),
            port = endpoint.port(),
            "using {var}"
        );
    }

    Ok(Telemetry::new(meter_provider))
}

/// Build the batching span pipeline. Also registers its provider as the
/// global tracer provider, which is what [`Telemetry::shutdown`] flushes.
fn install_tracer(endpoint: &OtlpEndpoint) -> Result<Tracer> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.grpc_target()),
        )
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default().with_resource(service_resource()),
        )
        .install_batch(runtime::Tokio)
        .context("failed to install OTLP tracing pipeline")
}

fn init_subscriber(tracer: Tracer, log_level: &str) -> Result<()> {
    build_subscriber(tracer, log_level)
        .try_init()
        .context("failed to initialise tracing subscriber")
}

/// Compose the JSON log layer and the span export layer.
///
/// `log_level` (or `RUST_LOG`) filters log output only. Span export has its
/// own fixed filter so request spans are exported at any log level.
fn build_subscriber(
    tracer: Tracer,
    log_level: &str,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let span_filter = Targets::new().with_target(env!("CARGO_CRATE_NAME"), Level::INFO);
    let otel_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(span_filter);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().json().with_filter(env_filter))
        .with(otel_layer)
}

/// Attributes attached to every exported span and metric.
pub fn service_resource() -> Resource {
    Resource::from_schema_url(
        [
            KeyValue::new(resource::SERVICE_NAME, SERVICE_NAME),
            KeyValue::new(resource::TELEMETRY_SDK_LANGUAGE, "rust"),
            KeyValue::new(resource::SERVICE_NAMESPACE, SERVICE_NAMESPACE),
        ],
        SCHEMA_URL,
    )
}
