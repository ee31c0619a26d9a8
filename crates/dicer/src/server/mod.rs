//! Axum HTTP server, routing, and request instrumentation.
//!
//! # Responsibilities
//! - Bind the plaintext TCP listener and serve until a shutdown signal arrives.
//! - Define the Axum router with both instrumented routes.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bind `addr` and serve `router` until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the accept loop fails.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, router, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{router, state::AppState};
    use crate::telemetry::Telemetry;
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(req.as_bytes()).await.unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        raw
    }

    #[tokio::test]
    async fn serves_both_routes_over_tcp_and_stops_on_shutdown() {
        let app = router::build(
            AppState::default(),
            Telemetry::new(SdkMeterProvider::default()),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_on(listener, app, async {
            let _ = stopped.await;
        }));

        let smoke = get(addr, "/smoke").await;
        assert!(smoke.starts_with("HTTP/1.1 200 OK"), "{smoke}");
        assert!(smoke.ends_with("\r\n\r\nOK"), "{smoke}");

        let roll = get(addr, "/rolldice").await;
        assert!(roll.starts_with("HTTP/1.1 200 OK"), "{roll}");
        let body = roll.rsplit("\r\n\r\n").next().unwrap();
        assert!(body.parse::<common::DieFace>().is_ok(), "{body}");

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let app = router::build(
            AppState::default(),
            Telemetry::new(SdkMeterProvider::default()),
        );
        assert!(serve(addr, app).await.is_err());
    }
}
