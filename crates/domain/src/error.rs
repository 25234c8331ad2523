use std::time::Duration;

/// Shared transport-level error type used across all liveness gateway crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// A remote service answered with a non-success status.
    #[error("{service} returned {status}: {message}")]
    Upstream {
        service: String,
        status: u16,
        message: String,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Client-visible outcome taxonomy for a liveness request.
///
/// Every variant maps to a distinct HTTP status in the response mapper.
/// Gateway failures keep the underlying [`Error`] as their source so logs
/// retain the transport detail while clients see a stable `kind`.
#[derive(thiserror::Error, Debug)]
pub enum LivenessError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("media staging failed: {0}")]
    StorageFailure(#[source] Error),

    #[error("liveness session creation failed: {0}")]
    SessionCreationFailure(#[source] Error),

    #[error("fetching result for session {session_id} failed: {source}")]
    ResultFetchFailure {
        session_id: String,
        #[source]
        source: Error,
    },

    #[error("liveness analysis failed for session {session_id}")]
    AnalysisFailed { session_id: String },

    #[error("liveness session {session_id} expired before a result was available")]
    AnalysisExpired { session_id: String },

    #[error("no result for session {session_id} within {}ms", .waited.as_millis())]
    AnalysisTimeout {
        session_id: String,
        waited: Duration,
    },

    #[error("polling for session {session_id} was cancelled")]
    Cancelled { session_id: String },
}

impl LivenessError {
    /// Stable snake_case identifier reported to clients as `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::StorageFailure(_) => "storage_failure",
            Self::SessionCreationFailure(_) => "session_creation_failure",
            Self::ResultFetchFailure { .. } => "result_fetch_failure",
            Self::AnalysisFailed { .. } => "analysis_failed",
            Self::AnalysisExpired { .. } => "analysis_expired",
            Self::AnalysisTimeout { .. } => "analysis_timeout",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// The session this error relates to, when one had been created.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::ResultFetchFailure { session_id, .. }
            | Self::AnalysisFailed { session_id }
            | Self::AnalysisExpired { session_id }
            | Self::AnalysisTimeout { session_id, .. }
            | Self::Cancelled { session_id } => Some(session_id),
            Self::InvalidInput(_)
            | Self::StorageFailure(_)
            | Self::SessionCreationFailure(_) => None,
        }
    }
}
