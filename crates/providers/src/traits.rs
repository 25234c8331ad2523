use lv_domain::error::Result;
use lv_domain::liveness::{LivenessSource, RemoteResult, StorageReference};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Object storage used to stage uploaded media.
///
/// Single attempt per call: retry policy belongs to the caller.
#[async_trait::async_trait]
pub trait StorageGateway: Send + Sync {
    /// Store `bytes` under a fresh key and return where they landed.
    async fn put(&self, bytes: Vec<u8>, content_type: Option<&str>) -> Result<StorageReference>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Liveness analysis
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Remote liveness-analysis service.
///
/// Implementations translate between the domain types and the wire format
/// of a concrete service. A transport failure is an `Err`; a session the
/// service itself marked as failed is an `Ok` with
/// [`SessionStatus::Failed`](lv_domain::liveness::SessionStatus::Failed).
#[async_trait::async_trait]
pub trait LivenessGateway: Send + Sync {
    /// Start an analysis session and return its id.
    async fn create_session(&self, source: LivenessSource) -> Result<String>;

    /// Fetch the current status (and score, once available) of a session.
    async fn get_result(&self, session_id: &str) -> Result<RemoteResult>;
}
