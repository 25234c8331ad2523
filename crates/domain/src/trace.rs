use serde::Serialize;

use crate::liveness::{SessionStatus, SourceKind};

/// Structured trace events emitted across all liveness gateway crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum LivenessEvent {
    AwsCall {
        service: String,
        operation: String,
        status: u16,
        duration_ms: u64,
    },
    MediaStaged {
        bucket: String,
        key: String,
        bytes: usize,
    },
    SessionCreated {
        session_id: String,
        source: SourceKind,
    },
    ResultPolled {
        session_id: String,
        attempt: u32,
        status: SessionStatus,
    },
    SessionResolved {
        session_id: String,
        confidence: f64,
        is_live: bool,
        incomplete: bool,
        polls: u32,
        elapsed_ms: u64,
    },
}

impl LivenessEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "lv_event");
    }
}
