//! Common error types shared across crates.

use thiserror::Error;

/// Startup configuration error.
///
/// Every variant is fatal: the process reports it on stderr and exits with
/// status 1 before any listener is bound.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The variable holds a value that is not a URL at all.
    #[error("{var}={value:?} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// The value parsed as a URL but carries no host to export to.
    #[error("{var}={value:?} has no host component (expected e.g. http://collector:4317)")]
    MissingHost { var: &'static str, value: String },

    /// A duration setting that must be strictly positive was zero.
    #[error("{var} must be > 0")]
    InvalidInterval { var: &'static str },
}

impl ConfigError {
    /// Name of the environment variable the error refers to.
    pub fn var(&self) -> &'static str {
        match self {
            ConfigError::InvalidUrl { var, .. }
            | ConfigError::MissingHost { var, .. }
            | ConfigError::InvalidInterval { var } => var,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_variable_and_value() {
        let e = ConfigError::MissingHost {
            var: "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
            value: "unix:/tmp/sock".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT"));
        assert!(msg.contains("unix:/tmp/sock"));
    }

    #[test]
    fn invalid_url_keeps_parse_error_as_source() {
        let source = url::Url::parse("::::").unwrap_err();
        let e = ConfigError::InvalidUrl {
            var: "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT",
            value: "::::".into(),
            source,
        };
        assert!(std::error::Error::source(&e).is_some());
        assert_eq!(e.var(), "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT");
    }
}
