//! Bearer-token authentication for the liveness endpoints.
//!
//! The token is read from the env var named by `server.api_token_env`
//! (default `LV_API_TOKEN`) once at startup and cached as a SHA-256 digest
//! in `AppState`. When the variable is unset or empty, requests pass
//! through unauthenticated (dev mode).

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected_hash) = state.api_token_hash.as_deref() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    // Compare fixed-length digests so the token length does not leak.
    let provided_hash = Sha256::digest(provided.as_bytes());
    if !bool::from(provided_hash.ct_eq(expected_hash)) {
        tracing::debug!(path = %req.uri().path(), "rejected request without valid token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "invalid or missing API token",
                "kind": "unauthorized",
            })),
        )
            .into_response();
    }

    next.run(req).await
}
