//! OpenTelemetry setup: traces, metrics, and structured logs exported over OTLP/gRPC.
//!
//! [`init_telemetry`] builds both export pipelines once at startup and returns
//! a [`Telemetry`] context. The HTTP layer receives that context explicitly;
//! request instrumentation reads the propagator and instruments from it.
//!
//! # Telemetry invariants
//!
//! - Exactly one server span and one duration sample per handled request.
//! - Export never blocks the request path: spans go through a batch processor
//!   and metrics through a periodic reader.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by
//!   `RUST_LOG` when set.

pub mod context;
pub mod init;
pub mod metrics;

pub use context::Telemetry;
pub use init::init_telemetry;
