//! End-to-end liveness workflow.
//!
//! `SessionCoordinator` validates the request, stages media when a storage
//! gateway is configured, creates the remote session, polls it with bounded
//! back-off and applies the confidence threshold. It holds no per-request
//! state: every call owns its own session and result values, so concurrent
//! requests never contend.
//!
//! Waiting is cooperative (`tokio::time::sleep` raced against a
//! [`CancellationToken`]). Dropping the future (client disconnect) or
//! cancelling the token (server shutdown) stops polling promptly; the
//! remote service's own processing is not affected.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use lv_domain::config::LivenessConfig;
use lv_domain::error::LivenessError;
use lv_domain::liveness::{LivenessResult, LivenessSource, Session, SessionStatus};
use lv_domain::trace::LivenessEvent;
use lv_providers::{LivenessGateway, StorageGateway};

use super::backoff::{Backoff, PollPolicy};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inputs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Uploaded media as received from the client.
#[derive(Clone, Default)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// A detect call: new media, or the id of a session to resume.
/// Exactly one must be present.
#[derive(Debug, Clone, Default)]
pub struct DetectRequest {
    pub video: Option<Upload>,
    pub session_id: Option<String>,
}

enum Validated {
    Upload(Upload),
    Resume(String),
}

impl DetectRequest {
    fn validate(self) -> Result<Validated, LivenessError> {
        let video = self.video.filter(|v| !v.bytes.is_empty());
        let session_id = self.session_id.and_then(non_blank);
        match (video, session_id) {
            (Some(v), None) => Ok(Validated::Upload(v)),
            (None, Some(id)) => Ok(Validated::Resume(id)),
            (Some(_), Some(_)) => Err(LivenessError::InvalidInput(
                "provide either a video or a session_id, not both".into(),
            )),
            (None, None) => Err(LivenessError::InvalidInput(
                "a non-empty video upload or a session_id is required".into(),
            )),
        }
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub confidence_threshold: f64,
    pub settle_delay: Duration,
    pub poll: PollPolicy,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from(&LivenessConfig::default())
    }
}

impl From<&LivenessConfig> for CoordinatorSettings {
    fn from(cfg: &LivenessConfig) -> Self {
        Self {
            confidence_threshold: cfg.confidence_threshold,
            settle_delay: cfg.settle_delay(),
            poll: PollPolicy::from(&cfg.poll),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Coordinator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionCoordinator {
    /// `None` = inline mode: uploads go straight into session creation.
    storage: Option<Arc<dyn StorageGateway>>,
    liveness: Arc<dyn LivenessGateway>,
    settings: CoordinatorSettings,
}

impl SessionCoordinator {
    pub fn new(
        storage: Option<Arc<dyn StorageGateway>>,
        liveness: Arc<dyn LivenessGateway>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            storage,
            liveness,
            settings,
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn stages_media(&self) -> bool {
        self.storage.is_some()
    }

    /// Full detect workflow: validate, (stage), create, await, decide.
    pub async fn detect(
        &self,
        req: DetectRequest,
        cancel: &CancellationToken,
    ) -> Result<LivenessResult, LivenessError> {
        let session_id = match req.validate()? {
            Validated::Resume(id) => {
                tracing::debug!(session_id = %id, "resuming existing session");
                id
            }
            Validated::Upload(upload) => {
                let source = self.stage(upload).await?;
                self.create(source).await?.session_id
            }
        };
        self.await_result(&session_id, cancel).await
    }

    /// Client-initiated mode: open a session with no media and hand the id
    /// back. The client captures frames itself and later asks for the
    /// result.
    pub async fn start_session(&self) -> Result<Session, LivenessError> {
        let token = Uuid::new_v4().to_string();
        self.create(LivenessSource::ClientToken(token)).await
    }

    /// Await and decide an existing session.
    pub async fn fetch_result(
        &self,
        session_id: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<LivenessResult, LivenessError> {
        let session_id = session_id
            .and_then(non_blank)
            .ok_or_else(|| LivenessError::InvalidInput("session_id is required".into()))?;
        self.await_result(&session_id, cancel).await
    }

    async fn stage(&self, upload: Upload) -> Result<LivenessSource, LivenessError> {
        let Some(ref storage) = self.storage else {
            return Ok(LivenessSource::InlineBytes(upload.bytes));
        };
        let size = upload.bytes.len();
        let reference = storage
            .put(upload.bytes, upload.content_type.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, bytes = size, "staging upload failed");
                LivenessError::StorageFailure(e)
            })?;
        tracing::debug!(reference = %reference, bytes = size, "upload staged");
        Ok(LivenessSource::Stored(reference))
    }

    async fn create(&self, source: LivenessSource) -> Result<Session, LivenessError> {
        let kind = source.kind();
        let session_id = self.liveness.create_session(source).await.map_err(|e| {
            tracing::warn!(error = %e, source = ?kind, "session creation failed");
            LivenessError::SessionCreationFailure(e)
        })?;
        tracing::info!(session_id = %session_id, source = ?kind, "liveness session started");
        Ok(Session {
            session_id,
            created_at: Utc::now(),
            source: kind,
        })
    }

    /// Poll until a terminal status, the deadline, or cancellation.
    ///
    /// The deadline is measured from the first poll. A poll that completes
    /// at or after the deadline is still honoured if it is terminal; one
    /// still in flight when the deadline passes is abandoned.
    async fn await_result(
        &self,
        session_id: &str,
        cancel: &CancellationToken,
    ) -> Result<LivenessResult, LivenessError> {
        let policy = self.settings.poll;
        let started = Instant::now();

        if !self.settings.settle_delay.is_zero() {
            pause(self.settings.settle_delay, session_id, cancel).await?;
        }

        let deadline = Instant::now() + policy.deadline;
        let mut backoff = Backoff::new(&policy);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let remote = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(session_id)),
                r = self.liveness.get_result(session_id) => r,
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(timed_out(session_id, attempt, policy.deadline))
                }
            }
            .map_err(|source| {
                tracing::warn!(session_id, attempt, error = %source, "result fetch failed");
                LivenessError::ResultFetchFailure {
                    session_id: session_id.to_owned(),
                    source,
                }
            })?;

            LivenessEvent::ResultPolled {
                session_id: session_id.to_owned(),
                attempt,
                status: remote.status,
            }
            .emit();

            match remote.status {
                SessionStatus::Succeeded => {
                    let result = LivenessResult::evaluate(
                        session_id,
                        remote.confidence,
                        self.settings.confidence_threshold,
                    );
                    if result.incomplete {
                        tracing::warn!(session_id, "session succeeded without a confidence score");
                    }
                    LivenessEvent::SessionResolved {
                        session_id: session_id.to_owned(),
                        confidence: result.confidence,
                        is_live: result.is_live,
                        incomplete: result.incomplete,
                        polls: attempt,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                    .emit();
                    return Ok(result);
                }
                SessionStatus::Failed => {
                    return Err(LivenessError::AnalysisFailed {
                        session_id: session_id.to_owned(),
                    })
                }
                SessionStatus::Expired => {
                    return Err(LivenessError::AnalysisExpired {
                        session_id: session_id.to_owned(),
                    })
                }
                SessionStatus::Pending => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(timed_out(session_id, attempt, policy.deadline));
            }
            let wait = backoff.next_delay().min(deadline - now);
            pause(wait, session_id, cancel).await?;
        }
    }
}

async fn pause(
    duration: Duration,
    session_id: &str,
    cancel: &CancellationToken,
) -> Result<(), LivenessError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled(session_id)),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

fn timed_out(session_id: &str, polls: u32, waited: Duration) -> LivenessError {
    tracing::warn!(session_id, polls, "gave up waiting for result");
    LivenessError::AnalysisTimeout {
        session_id: session_id.to_owned(),
        waited,
    }
}

fn cancelled(session_id: &str) -> LivenessError {
    tracing::info!(session_id, "polling cancelled");
    LivenessError::Cancelled {
        session_id: session_id.to_owned(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use lv_domain::error::{Error, Result};
    use lv_domain::liveness::{RemoteResult, SourceKind, StorageReference};

    // ── Stubs ───────────────────────────────────────────────────────

    #[derive(Default)]
    struct StubStorage {
        fail: bool,
        puts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl StorageGateway for StubStorage {
        async fn put(&self, bytes: Vec<u8>, _ct: Option<&str>) -> Result<StorageReference> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Http("connection refused".into()));
            }
            Ok(StorageReference {
                bucket: "media".into(),
                key: format!("liveness/{}", bytes.len()),
            })
        }
    }

    /// Replays a scripted sequence of results; the last entry repeats.
    struct StubLiveness {
        script: Mutex<VecDeque<Result<RemoteResult>>>,
        last: RemoteResult,
        creates: AtomicUsize,
        polls: AtomicUsize,
        sources: Mutex<Vec<SourceKind>>,
        fail_create: bool,
        /// Time each `get_result` call takes before answering.
        poll_latency: Duration,
    }

    impl StubLiveness {
        fn new(script: Vec<Result<RemoteResult>>, last: RemoteResult) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last,
                creates: AtomicUsize::new(0),
                polls: AtomicUsize::new(0),
                sources: Mutex::new(Vec::new()),
                fail_create: false,
                poll_latency: Duration::ZERO,
            }
        }

        fn always(status: SessionStatus, confidence: Option<f64>) -> Self {
            Self::new(Vec::new(), RemoteResult { status, confidence })
        }
    }

    #[async_trait::async_trait]
    impl LivenessGateway for StubLiveness {
        async fn create_session(&self, source: LivenessSource) -> Result<String> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.sources.lock().unwrap().push(source.kind());
            if self.fail_create {
                return Err(Error::Upstream {
                    service: "rekognition".into(),
                    status: 500,
                    message: "InternalServerError".into(),
                });
            }
            Ok("sess-1".into())
        }

        async fn get_result(&self, _session_id: &str) -> Result<RemoteResult> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            if !self.poll_latency.is_zero() {
                tokio::time::sleep(self.poll_latency).await;
            }
            match self.script.lock().unwrap().pop_front() {
                Some(r) => r,
                None => Ok(self.last),
            }
        }
    }

    fn pending() -> Result<RemoteResult> {
        Ok(RemoteResult {
            status: SessionStatus::Pending,
            confidence: None,
        })
    }

    fn upload() -> DetectRequest {
        DetectRequest {
            video: Some(Upload {
                bytes: vec![1, 2, 3],
                content_type: Some("video/mp4".into()),
            }),
            session_id: None,
        }
    }

    fn coordinator(
        storage: Option<Arc<StubStorage>>,
        liveness: Arc<StubLiveness>,
    ) -> SessionCoordinator {
        SessionCoordinator::new(
            storage.map(|s| s as Arc<dyn StorageGateway>),
            liveness,
            CoordinatorSettings::default(),
        )
    }

    // ── Polling ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn pending_twice_then_success() {
        let liveness = Arc::new(StubLiveness::new(
            vec![pending(), pending()],
            RemoteResult {
                status: SessionStatus::Succeeded,
                confidence: Some(90.0),
            },
        ));
        let coord = coordinator(None, liveness.clone());

        let start = Instant::now();
        let result = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.is_live);
        assert!(!result.incomplete);
        assert_eq!(result.confidence, 90.0);
        assert_eq!(result.session_id, "sess-1");
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 3);
        // 1s + 2s of back-off between the three polls.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn always_pending_times_out_at_deadline() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Pending, None));
        let coord = coordinator(None, liveness.clone());

        let start = Instant::now();
        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LivenessError::AnalysisTimeout { .. }), "{err:?}");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(61), "{elapsed:?}");
        // t = 0, 1, 3, 7, 12, 17, ..., 57, 60
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_poll_is_cut_off_at_deadline() {
        let mut stub = StubLiveness::always(SessionStatus::Pending, None);
        stub.poll_latency = Duration::from_secs(50);
        let liveness = Arc::new(stub);
        let coord = coordinator(None, liveness.clone());

        let start = Instant::now();
        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LivenessError::AnalysisTimeout { .. }), "{err:?}");
        // First poll answers at 50s, second starts at 51s and is dropped at 60s.
        assert_eq!(start.elapsed(), Duration::from_secs(60));
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_delay_precedes_first_poll() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(99.0)));
        let mut settings = CoordinatorSettings::default();
        settings.settle_delay = Duration::from_secs(10);
        let coord = SessionCoordinator::new(None, liveness.clone(), settings);

        let start = Instant::now();
        let result = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_live);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Pending, None));
        let coord = coordinator(None, liveness.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = coord.detect(upload(), &cancel).await.unwrap_err();
        assert!(matches!(err, LivenessError::Cancelled { .. }), "{err:?}");
        assert!(start.elapsed() < Duration::from_secs(6));
        // t = 0, 1, 3 before the cancel at t = 5
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_status_is_analysis_failed() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Failed, None));
        let coord = coordinator(None, liveness);
        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LivenessError::AnalysisFailed { ref session_id } if session_id == "sess-1"));
    }

    #[tokio::test]
    async fn expired_status_is_analysis_expired() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Expired, None));
        let coord = coordinator(None, liveness);
        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LivenessError::AnalysisExpired { .. }));
    }

    #[tokio::test]
    async fn fetch_error_is_distinct_from_failed_status() {
        let liveness = Arc::new(StubLiveness::new(
            vec![Err(Error::Timeout("read timed out".into()))],
            RemoteResult {
                status: SessionStatus::Succeeded,
                confidence: Some(99.0),
            },
        ));
        let coord = coordinator(None, liveness.clone());
        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LivenessError::ResultFetchFailure { .. }), "{err:?}");
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_confidence_is_incomplete_not_live() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, None));
        let coord = coordinator(None, liveness);
        let result = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!result.is_live);
        assert!(result.incomplete);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn threshold_is_exclusive() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(85.0)));
        let coord = coordinator(None, liveness);
        let result = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!result.is_live);
    }

    // ── Validation and staging ──────────────────────────────────────

    #[tokio::test]
    async fn malformed_request_makes_no_calls() {
        let storage = Arc::new(StubStorage::default());
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(99.0)));
        let coord = coordinator(Some(storage.clone()), liveness.clone());

        for req in [
            DetectRequest::default(),
            DetectRequest {
                video: Some(Upload::default()),
                session_id: Some("   ".into()),
            },
            DetectRequest {
                session_id: Some("sess-9".into()),
                ..upload()
            },
        ] {
            let err = coord
                .detect(req, &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, LivenessError::InvalidInput(_)), "{err:?}");
        }

        assert_eq!(storage.puts.load(Ordering::SeqCst), 0);
        assert_eq!(liveness.creates.load(Ordering::SeqCst), 0);
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn storage_failure_short_circuits() {
        let storage = Arc::new(StubStorage {
            fail: true,
            ..Default::default()
        });
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(99.0)));
        let coord = coordinator(Some(storage.clone()), liveness.clone());

        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LivenessError::StorageFailure(_)), "{err:?}");
        assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
        assert_eq!(liveness.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn staged_upload_creates_from_reference() {
        let storage = Arc::new(StubStorage::default());
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(99.0)));
        let coord = coordinator(Some(storage.clone()), liveness.clone());

        coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
        assert_eq!(*liveness.sources.lock().unwrap(), vec![SourceKind::Stored]);
    }

    #[tokio::test]
    async fn inline_mode_sends_bytes() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(99.0)));
        let coord = coordinator(None, liveness.clone());
        assert!(!coord.stages_media());

        coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(*liveness.sources.lock().unwrap(), vec![SourceKind::Inline]);
    }

    #[tokio::test]
    async fn session_creation_failure_propagates() {
        let mut stub = StubLiveness::always(SessionStatus::Succeeded, Some(99.0));
        stub.fail_create = true;
        let liveness = Arc::new(stub);
        let coord = coordinator(None, liveness.clone());

        let err = coord
            .detect(upload(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LivenessError::SessionCreationFailure(_)));
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resume_skips_creation() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(91.0)));
        let coord = coordinator(None, liveness.clone());

        let result = coord
            .detect(
                DetectRequest {
                    video: None,
                    session_id: Some(" sess-7 ".into()),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(result.session_id, "sess-7");
        assert_eq!(liveness.creates.load(Ordering::SeqCst), 0);
    }

    // ── Client-initiated sessions ───────────────────────────────────

    #[tokio::test]
    async fn start_session_uses_client_token() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Pending, None));
        let coord = coordinator(Some(Arc::new(StubStorage::default())), liveness.clone());

        let session = coord.start_session().await.unwrap();
        assert_eq!(session.session_id, "sess-1");
        assert_eq!(session.source, SourceKind::ClientToken);
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_result_requires_session_id() {
        let liveness = Arc::new(StubLiveness::always(SessionStatus::Succeeded, Some(99.0)));
        let coord = coordinator(None, liveness.clone());
        let err = coord
            .fetch_result(None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LivenessError::InvalidInput(_)));
        assert_eq!(liveness.polls.load(Ordering::SeqCst), 0);
    }
}
