//! Configuration loading and validation for the dicer service.
//!
//! All values are read from environment variables at startup. Unset or empty
//! variables fall back to their defaults. The process exits with a clear error
//! message if an endpoint cannot be parsed, before any listener is bound.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use common::ConfigError;
use serde::Deserialize;
use url::Url;

pub const TRACES_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";
pub const METRICS_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT";
pub const METRIC_INTERVAL_VAR: &str = "OTEL_METRIC_EXPORT_INTERVAL";

/// Port assumed when an endpoint URL does not name one (OTLP/gRPC).
const OTLP_GRPC_PORT: u16 = 4317;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Collector URL for span export.
    #[serde(default = "default_otlp_endpoint")]
    pub otel_exporter_otlp_traces_endpoint: String,

    /// Collector URL for metric export.
    #[serde(default = "default_otlp_endpoint")]
    pub otel_exporter_otlp_metrics_endpoint: String,

    /// Metric export period in milliseconds.
    #[serde(default = "default_metric_export_interval")]
    pub otel_metric_export_interval: u64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4018".into()
}
fn default_metric_export_interval() -> u64 {
    3000
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be deserialised or an endpoint is
    /// not a usable URL.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    /// Load and validate configuration from an explicit environment source.
    pub fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env.ignore_empty(true))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<(), ConfigError> {
        self.traces_endpoint()?;
        self.metrics_endpoint()?;
        if self.otel_metric_export_interval == 0 {
            return Err(ConfigError::InvalidInterval {
                var: METRIC_INTERVAL_VAR,
            });
        }
        Ok(())
    }

    pub fn traces_endpoint(&self) -> Result<OtlpEndpoint, ConfigError> {
        OtlpEndpoint::parse(TRACES_ENDPOINT_VAR, &self.otel_exporter_otlp_traces_endpoint)
    }

    pub fn metrics_endpoint(&self) -> Result<OtlpEndpoint, ConfigError> {
        OtlpEndpoint::parse(METRICS_ENDPOINT_VAR, &self.otel_exporter_otlp_metrics_endpoint)
    }

    pub fn metric_export_interval(&self) -> Duration {
        Duration::from_millis(self.otel_metric_export_interval)
    }
}

/// A collector address resolved from one of the `OTEL_EXPORTER_OTLP_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtlpEndpoint {
    url: Url,
    host: String,
    port: u16,
}

impl OtlpEndpoint {
    /// Parse `raw` (the value of `var`) into an endpoint.
    ///
    /// Only the host and port are kept for export; the scheme and path of the
    /// configured URL are ignored because the channel is always plaintext gRPC.
    pub fn parse(var: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
            var,
            value: raw.to_owned(),
            source,
        })?;
        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_owned(),
            _ => {
                return Err(ConfigError::MissingHost {
                    var,
                    value: raw.to_owned(),
                })
            }
        };
        let port = url.port().unwrap_or(OTLP_GRPC_PORT);
        Ok(Self { url, host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Target handed to the tonic exporter: `http://<host>:<port>`.
    pub fn grpc_target(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for OtlpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_otlp_endpoint(), "http://localhost:4018");
        assert_eq!(default_metric_export_interval(), 3000);
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn unset_endpoints_resolve_to_default() {
        let cfg = Config::load(env(&[])).unwrap();
        let traces = cfg.traces_endpoint().unwrap();
        assert_eq!(traces.host(), "localhost");
        assert_eq!(traces.port(), 4018);
        assert_eq!(cfg.metrics_endpoint().unwrap().grpc_target(), "http://localhost:4018");
        assert_eq!(cfg.metric_export_interval(), Duration::from_secs(3));
        assert_eq!(cfg.listen_port, 8080);
    }

    #[test]
    fn empty_endpoint_falls_back_to_default() {
        let cfg = Config::load(env(&[(TRACES_ENDPOINT_VAR, "")])).unwrap();
        assert_eq!(cfg.otel_exporter_otlp_traces_endpoint, "http://localhost:4018");
    }

    #[test]
    fn endpoints_are_read_from_environment() {
        let cfg = Config::load(env(&[
            (TRACES_ENDPOINT_VAR, "http://otel-collector:4317"),
            (METRICS_ENDPOINT_VAR, "http://10.0.0.7:4319/v1/metrics"),
            ("LISTEN_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(cfg.traces_endpoint().unwrap().grpc_target(), "http://otel-collector:4317");
        assert_eq!(cfg.metrics_endpoint().unwrap().grpc_target(), "http://10.0.0.7:4319");
        assert_eq!(cfg.listen_port, 9090);
    }

    #[test]
    fn unparsable_endpoint_is_fatal() {
        let err = Config::load(env(&[(TRACES_ENDPOINT_VAR, "::::")])).unwrap_err();
        let cfg_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(cfg_err, ConfigError::InvalidUrl { .. }));
        assert_eq!(cfg_err.var(), TRACES_ENDPOINT_VAR);
    }

    #[test]
    fn endpoint_without_host_is_rejected() {
        let err = OtlpEndpoint::parse(METRICS_ENDPOINT_VAR, "unix:/var/run/otel.sock").unwrap_err();
        assert!(matches!(err, ConfigError::MissingHost { .. }));
    }

    #[test]
    fn endpoint_without_port_uses_otlp_grpc_default() {
        let ep = OtlpEndpoint::parse(TRACES_ENDPOINT_VAR, "http://collector").unwrap();
        assert_eq!(ep.grpc_target(), "http://collector:4317");
    }

    #[test]
    fn ipv6_host_keeps_brackets() {
        let ep = OtlpEndpoint::parse(TRACES_ENDPOINT_VAR, "http://[::1]:4018").unwrap();
        assert_eq!(ep.grpc_target(), "http://[::1]:4018");
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let err = Config::load(env(&[(METRIC_INTERVAL_VAR, "0")])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidInterval { .. })
        ));
    }
}
