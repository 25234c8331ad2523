//! Liveness runtime: the request-scoped workflow and its poll schedule.

pub mod backoff;
pub mod coordinator;

pub use backoff::{Backoff, PollPolicy};
pub use coordinator::{CoordinatorSettings, DetectRequest, SessionCoordinator, Upload};
