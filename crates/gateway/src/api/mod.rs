pub mod auth;
pub mod cors;
pub mod liveness;
pub mod response;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the API router.
///
/// `/` is public. The liveness endpoints sit behind the bearer-token
/// middleware and answer both with and without a trailing slash.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(liveness::home));

    let protected = Router::new()
        .route("/detect_liveliness", post(liveness::detect_liveliness))
        .route("/detect_liveliness/", post(liveness::detect_liveliness))
        .route(
            "/start_liveness_session",
            post(liveness::start_liveness_session),
        )
        .route(
            "/start_liveness_session/",
            post(liveness::start_liveness_session),
        )
        .route("/get_liveness_result", get(liveness::get_liveness_result))
        .route("/get_liveness_result/", get(liveness::get_liveness_result))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

/// Router plus the layers every deployment gets: upload size limit and
/// request tracing. `serve` adds CORS and the concurrency limit on top.
pub fn build_app(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;
    router(state.clone())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
