//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use common::protocol::{SMOKE_BODY, TEXT_PLAIN};
use tracing::info;

use super::state::AppState;

/// `GET /rolldice` — roll the shared die and return the face as decimal text.
pub async fn roll_dice(State(state): State<AppState>) -> Response {
    let face = state.dice.roll();
    info!(dice = face.get(), "rolldice called");
    plain_text(StatusCode::OK, face.to_string())
}

/// `GET /smoke` — always `200 OK` with body `OK`.
pub async fn smoke() -> Response {
    plain_text(StatusCode::OK, SMOKE_BODY)
}

/// Catch-all 404 handler.
pub async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "the requested resource does not exist")
}

fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(CONTENT_TYPE, TEXT_PLAIN)], body.into()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use common::DieFace;
    use tower::ServiceExt;

    use crate::dice::Dice;

    fn test_router() -> Router {
        Router::new()
            .route("/rolldice", get(roll_dice))
            .route("/smoke", get(smoke))
            .fallback(not_found)
            .with_state(AppState::new(Dice::with_seed(1)))
    }

    async fn call(uri: &str) -> (StatusCode, String, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        let status = resp.status();
        let ct = resp.headers()[CONTENT_TYPE].to_str().unwrap().to_owned();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, ct, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn smoke_returns_ok_text() {
        let (status, ct, body) = call("/smoke").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ct, TEXT_PLAIN);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn roll_returns_a_die_face() {
        let (status, ct, body) = call("/rolldice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ct, TEXT_PLAIN);
        assert!(body.parse::<DieFace>().is_ok(), "unexpected body {body:?}");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, _, _) = call("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
