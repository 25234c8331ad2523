//! Bounded exponential back-off schedule for result polling.

use std::time::Duration;

use lv_domain::config::PollConfig;

/// Poll timing for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Total time allowed from the first poll until giving up.
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(cfg: &PollConfig) -> Self {
        Self {
            initial_backoff: cfg.initial_backoff(),
            max_backoff: cfg.max_backoff(),
            deadline: cfg.deadline(),
        }
    }
}

/// Doubling delay capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(policy: &PollPolicy) -> Self {
        Self {
            next: policy.initial_backoff.min(policy.max_backoff),
            max: policy.max_backoff,
        }
    }

    /// The delay to wait now; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.next;
        self.next = self.next.saturating_mul(2).min(self.max);
        current
    }
}
