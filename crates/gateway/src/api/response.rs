//! Maps workflow outcomes to HTTP responses.
//!
//! Everything here is a pure function of its input: no logging, no clock,
//! no state. Handlers log before mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

use lv_domain::error::LivenessError;
use lv_domain::liveness::{LivenessResult, Session};

/// A status and JSON body, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for MappedResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn status_for(err: &LivenessError) -> StatusCode {
    match err {
        LivenessError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LivenessError::StorageFailure(_)
        | LivenessError::SessionCreationFailure(_)
        | LivenessError::ResultFetchFailure { .. }
        | LivenessError::AnalysisFailed { .. } => StatusCode::BAD_GATEWAY,
        LivenessError::AnalysisExpired { .. } => StatusCode::GONE,
        LivenessError::AnalysisTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        LivenessError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// `{"error", "kind", "session_id"?}`
pub fn error_body(err: &LivenessError) -> Value {
    let mut body = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    if let Some(id) = err.session_id() {
        body["session_id"] = Value::String(id.to_owned());
    }
    body
}

pub fn map_error(err: &LivenessError) -> MappedResponse {
    MappedResponse {
        status: status_for(err),
        body: error_body(err),
    }
}

/// Verdict or error for the detect and result endpoints.
pub fn map_outcome(outcome: &Result<LivenessResult, LivenessError>) -> MappedResponse {
    match outcome {
        Ok(r) => MappedResponse {
            status: StatusCode::OK,
            body: json!({
                "session_id": r.session_id,
                "liveliness_detected": r.is_live,
                "confidence": r.confidence,
                "incomplete": r.incomplete,
            }),
        },
        Err(e) => map_error(e),
    }
}

/// Session handle or error for the start-session endpoint.
pub fn map_session(outcome: &Result<Session, LivenessError>) -> MappedResponse {
    match outcome {
        Ok(s) => MappedResponse {
            status: StatusCode::OK,
            body: json!({
                "session_id": s.session_id,
                "created_at": s.created_at.to_rfc3339(),
            }),
        },
        Err(e) => map_error(e),
    }
}
