//! `dicer` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (OTLP traces + metrics, tracing logs).
//! 3. Build the Axum router with both instrumented routes.
//! 4. Serve until SIGINT/SIGTERM, then flush pending telemetry.

mod config;
mod dice;
mod server;
mod telemetry;

use std::process::ExitCode;

use tracing::{error, info};

use config::Config;
use dice::Dice;
use server::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    let telemetry = match telemetry::init_telemetry(&cfg) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("ERROR: telemetry initialisation failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        metric_export_interval_ms = cfg.otel_metric_export_interval,
        "dicer starting"
    );

    // -----------------------------------------------------------------------
    // 3. Router
    // -----------------------------------------------------------------------
    let state = AppState::new(Dice::seeded_from_clock());
    let router = server::router::build(state, telemetry.clone());

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(port = cfg.listen_port, "starting http server");
    if let Err(e) = server::serve(addr, router).await {
        error!(error = %e, "error running server");
    }

    // Provider shutdown blocks on the exporters' background tasks.
    if let Err(e) = tokio::task::spawn_blocking(move || telemetry.shutdown()).await {
        error!(error = %e, "telemetry shutdown task failed");
    }

    ExitCode::SUCCESS
}
