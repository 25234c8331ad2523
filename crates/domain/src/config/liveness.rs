use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Liveness workflow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where uploaded media goes before the analysis session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StagingMode {
    /// Write the upload to the configured bucket and hand the analysis
    /// service an object reference.
    #[default]
    S3,
    /// Send the bytes inline with the session creation call.
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Scores strictly above this value are reported as live.
    #[serde(default = "d_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub staging: StagingMode,
    /// Object key prefix for staged uploads.
    #[serde(default = "d_key_prefix")]
    pub key_prefix: String,
    /// Fixed wait before the first result poll. The service rarely has a
    /// verdict immediately after creation.
    #[serde(default)]
    pub settle_delay_ms: u64,
    /// Forwarded to session creation as the audit image cap.
    #[serde(default)]
    pub audit_images_limit: Option<u32>,
    #[serde(default)]
    pub poll: PollConfig,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: d_threshold(),
            staging: StagingMode::default(),
            key_prefix: d_key_prefix(),
            settle_delay_ms: 0,
            audit_images_limit: None,
            poll: PollConfig::default(),
        }
    }
}

impl LivenessConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Bounded exponential back-off for result polling.
///
/// The delay starts at `initial_backoff_ms`, doubles after every
/// non-terminal poll and is capped at `max_backoff_ms`. Polling stops once
/// `deadline_ms` has elapsed since the first poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "d_initial_backoff")]
    pub initial_backoff_ms: u64,
    #[serde(default = "d_max_backoff")]
    pub max_backoff_ms: u64,
    #[serde(default = "d_deadline")]
    pub deadline_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: d_initial_backoff(),
            max_backoff_ms: d_max_backoff(),
            deadline_ms: d_deadline(),
        }
    }
}

impl PollConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_threshold() -> f64 {
    85.0
}
fn d_key_prefix() -> String {
    "liveness/".into()
}
fn d_initial_backoff() -> u64 {
    1_000
}
fn d_max_backoff() -> u64 {
    5_000
}
fn d_deadline() -> u64 {
    60_000
}
