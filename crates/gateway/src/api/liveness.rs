//! Liveness endpoints.
//!
//! Handlers only translate HTTP to coordinator calls and back. Each request
//! polls under a child of the shutdown token; if the client disconnects,
//! axum drops the handler future and polling stops with it.

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use lv_domain::error::LivenessError;

use super::response::{map_error, map_outcome, map_session};
use crate::runtime::{DetectRequest, Upload};
use crate::state::AppState;

const VIDEO_FIELD: &str = "video";
const SESSION_ID_FIELD: &str = "session_id";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn home() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Liveliness Detection API is Running!" }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /detect_liveliness/
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn detect_liveliness(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("detect_liveliness", %request_id, "otel.kind" = "SERVER");

    async move {
        let req = match multipart {
            Ok(m) => match read_detect_form(m).await {
                Ok(req) => req,
                Err(resp) => return resp,
            },
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected non-multipart body");
                return map_error(&LivenessError::InvalidInput(rejection.body_text()))
                    .into_response();
            }
        };

        let cancel = state.shutdown.child_token();
        let outcome = state.coordinator.detect(req, &cancel).await;
        log_outcome(&outcome);
        map_outcome(&outcome).into_response()
    }
    .instrument(span)
    .await
}

/// Collect the `video` and `session_id` fields; other fields are ignored.
async fn read_detect_form(mut multipart: Multipart) -> Result<DetectRequest, Response> {
    let mut req = DetectRequest::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e.status(), e.body_text())),
        };
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(VIDEO_FIELD) => req.video = Some(read_upload(field).await?),
            Some(SESSION_ID_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e.status(), e.body_text()))?;
                req.session_id = Some(text);
            }
            other => tracing::debug!(field = ?other, "ignoring unknown form field"),
        }
    }
    Ok(req)
}

async fn read_upload(field: Field<'_>) -> Result<Upload, Response> {
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| multipart_error(e.status(), e.body_text()))?;
    tracing::debug!(bytes = bytes.len(), content_type = ?content_type, "received upload");
    Ok(Upload {
        bytes: bytes.to_vec(),
        content_type,
    })
}

/// Malformed or oversized form data never reaches the coordinator.
fn multipart_error(status: StatusCode, message: String) -> Response {
    let kind = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "invalid_input"
    };
    tracing::debug!(%status, %message, "multipart read failed");
    (
        status,
        Json(serde_json::json!({ "error": message, "kind": kind })),
    )
        .into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /start_liveness_session/
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn start_liveness_session(State(state): State<AppState>) -> Response {
    let span = tracing::info_span!("start_liveness_session", "otel.kind" = "SERVER");
    async move {
        let outcome = state.coordinator.start_session().await;
        if let Err(ref e) = outcome {
            tracing::warn!(error = %e, kind = e.kind(), "could not start session");
        }
        map_session(&outcome).into_response()
    }
    .instrument(span)
    .await
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /get_liveness_result/?session_id=
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

pub async fn get_liveness_result(
    State(state): State<AppState>,
    Query(q): Query<ResultQuery>,
) -> Response {
    let span = tracing::info_span!(
        "get_liveness_result",
        session_id = q.session_id.as_deref().unwrap_or(""),
        "otel.kind" = "SERVER",
    );
    async move {
        let cancel = state.shutdown.child_token();
        let outcome = state.coordinator.fetch_result(q.session_id, &cancel).await;
        log_outcome(&outcome);
        map_outcome(&outcome).into_response()
    }
    .instrument(span)
    .await
}

fn log_outcome<T>(outcome: &Result<T, LivenessError>) {
    match outcome {
        Ok(_) => {}
        Err(e @ LivenessError::InvalidInput(_)) => {
            tracing::info!(error = %e, "rejected request")
        }
        Err(e) => tracing::warn!(
            error = %e,
            kind = e.kind(),
            session_id = e.session_id().unwrap_or(""),
            "liveness request failed"
        ),
    }
}
