//! Axum router construction.

use axum::Router;
use common::Route;

use super::{
    handlers,
    middleware::instrumented,
    state::AppState,
};
use crate::telemetry::Telemetry;

/// Build the application [`Router`] with both instrumented routes attached.
///
/// Each route carries its own timeout inside its instrumentation layer.
pub fn build(state: AppState, telemetry: Telemetry) -> Router {
    Router::new()
        .route(
            Route::Roll.path(),
            instrumented(handlers::roll_dice, Route::Roll, &telemetry),
        )
        .route(
            Route::Smoke.path(),
            instrumented(handlers::smoke, Route::Smoke, &telemetry),
        )
        .fallback(handlers::not_found)
        .with_state(state)
}
