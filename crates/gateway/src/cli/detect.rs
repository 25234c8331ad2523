//! `liveness-gateway detect <path>`: one-shot check without the HTTP layer.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use lv_domain::config::Config;

use crate::api::response::map_outcome;
use crate::bootstrap;
use crate::runtime::{DetectRequest, Upload};

/// Run the full workflow on a local file and print the response body.
/// Returns `true` when the response status is 200.
pub async fn run(
    config: Arc<Config>,
    path: &Path,
    content_type: Option<String>,
) -> anyhow::Result<bool> {
    bootstrap::check_config(&config)?;
    let coordinator = bootstrap::build_coordinator(&config)?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let content_type = content_type.or_else(|| guess_content_type(path).map(str::to_owned));
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read video");

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let req = DetectRequest {
        video: Some(Upload {
            bytes,
            content_type,
        }),
        session_id: None,
    };
    let outcome = coordinator.detect(req, &cancel).await;
    let mapped = map_outcome(&outcome);

    println!("{}", serde_json::to_string_pretty(&mapped.body)?);
    Ok(mapped.status.is_success())
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let ct = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => return None,
    };
    Some(ct)
}
