use std::sync::Arc;

use lv_domain::config::Config;
use tokio_util::sync::CancellationToken;

use crate::runtime::SessionCoordinator;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub coordinator: Arc<SessionCoordinator>,

    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,

    /// Root token cancelled on graceful shutdown. Handlers poll under a
    /// child token so in-flight waits end promptly.
    pub shutdown: CancellationToken,
}
