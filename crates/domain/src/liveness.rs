//! Liveness data model: where the media comes from, what the remote service
//! reports, and the verdict derived from it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sources
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Location of an object written by the storage gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for StorageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// What a liveness session is created from. Exactly one variant per call.
#[derive(Clone, PartialEq)]
pub enum LivenessSource {
    /// Raw media sent inline with the creation request.
    InlineBytes(Vec<u8>),
    /// Media previously staged in object storage.
    Stored(StorageReference),
    /// No media: the client captures frames itself after receiving the
    /// session id. The token doubles as the idempotency key.
    ClientToken(String),
}

impl LivenessSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::InlineBytes(_) => SourceKind::Inline,
            Self::Stored(_) => SourceKind::Stored,
            Self::ClientToken(_) => SourceKind::ClientToken,
        }
    }
}

// Media can be tens of megabytes; never dump it into logs.
impl fmt::Debug for LivenessSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InlineBytes(bytes) => f
                .debug_tuple("InlineBytes")
                .field(&format_args!("{} bytes", bytes.len()))
                .finish(),
            Self::Stored(r) => f.debug_tuple("Stored").field(r).finish(),
            Self::ClientToken(t) => f.debug_tuple("ClientToken").field(t).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Inline,
    Stored,
    ClientToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A liveness session created on the remote service. Request-scoped;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub source: SourceKind,
}

/// Progress of a session as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Succeeded,
    Failed,
    Expired,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One `get_result` observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteResult {
    pub status: SessionStatus,
    /// 0-100. `None` when the service omitted the field.
    pub confidence: Option<f64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Verdict
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Final verdict for a resolved session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivenessResult {
    pub session_id: String,
    pub confidence: f64,
    pub is_live: bool,
    /// The service reported success but no confidence score.
    pub incomplete: bool,
}

impl LivenessResult {
    /// Apply the threshold to a confidence score. A missing score is
    /// recorded as `0` and flagged incomplete; it is never live.
    pub fn evaluate(session_id: impl Into<String>, confidence: Option<f64>, threshold: f64) -> Self {
        let (confidence, incomplete) = match confidence {
            Some(c) if c.is_finite() => (c, false),
            _ => (0.0, true),
        };
        Self {
            session_id: session_id.into(),
            confidence,
            is_live: !incomplete && is_live(confidence, threshold),
            incomplete,
        }
    }
}

/// Strictly-greater comparison: a score equal to the threshold is not live.
pub fn is_live(confidence: f64, threshold: f64) -> bool {
    confidence > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary_is_exclusive() {
        assert!(!is_live(85.0, 85.0));
        assert!(is_live(85.0001, 85.0));
        assert!(!is_live(0.0, 85.0));
        assert!(is_live(100.0, 85.0));
    }

    #[test]
    fn evaluate_with_score() {
        let r = LivenessResult::evaluate("s1", Some(90.0), 85.0);
        assert_eq!(r.session_id, "s1");
        assert!(r.is_live);
        assert!(!r.incomplete);
        assert!((r.confidence - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_confidence_is_never_live() {
        let r = LivenessResult::evaluate("s1", None, 85.0);
        assert!(!r.is_live);
        assert!(r.incomplete);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn missing_confidence_not_live_even_with_negative_threshold() {
        let r = LivenessResult::evaluate("s1", None, -1.0);
        assert!(!r.is_live);
        assert!(r.incomplete);
    }

    #[test]
    fn nan_confidence_treated_as_missing() {
        let r = LivenessResult::evaluate("s1", Some(f64::NAN), 85.0);
        assert!(!r.is_live);
        assert!(r.incomplete);
    }

    #[test]
    fn pending_is_the_only_non_terminal_status() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(SessionStatus::Succeeded.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Expired.is_terminal());
    }

    #[test]
    fn inline_bytes_debug_hides_payload() {
        let src = LivenessSource::InlineBytes(vec![0xAB; 4096]);
        assert_eq!(format!("{src:?}"), "InlineBytes(4096 bytes)");
        assert_eq!(src.kind(), SourceKind::Inline);
    }

    #[test]
    fn storage_reference_display() {
        let r = StorageReference {
            bucket: "media".into(),
            key: "liveness/abc".into(),
        };
        assert_eq!(r.to_string(), "s3://media/liveness/abc");
    }
}
