//! AppState construction extracted from `main.rs`.
//!
//! `serve` and the one-shot `detect` command share this path so both run
//! against the same validated config and wired gateways.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use lv_domain::config::{Config, ConfigSeverity, StagingMode};
use lv_providers::{
    AwsHttp, LivenessGateway, RekognitionLivenessGateway, S3StorageGateway, StorageGateway,
};

use crate::runtime::{CoordinatorSettings, SessionCoordinator};
use crate::state::AppState;

/// Validate config, resolve AWS settings from the environment and return a
/// fully-wired [`AppState`].
pub fn build_app_state(config: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<AppState> {
    check_config(&config)?;

    let coordinator = Arc::new(build_coordinator(&config)?);

    // ── API token (read once, hash for constant-time comparison) ────
    let api_token_hash = {
        let env_var = &config.server.api_token_env;
        match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
            Some(t) => {
                tracing::info!(source = %format!("env:{env_var}"), "API bearer-token auth enabled");
                Some(Sha256::digest(t.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!("API bearer-token auth DISABLED, set {env_var} to enable it");
                None
            }
        }
    };

    Ok(AppState {
        config,
        coordinator,
        api_token_hash,
        shutdown,
    })
}

/// Log every config issue and fail if any is an error.
pub fn check_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Resolve credentials and construct the gateways and coordinator.
pub fn build_coordinator(config: &Config) -> anyhow::Result<SessionCoordinator> {
    let staging = config.liveness.staging;
    let aws = config
        .aws
        .resolve(staging)
        .context("resolving AWS settings from the environment")?;
    tracing::info!(
        region = %aws.region,
        bucket = aws.bucket.as_deref().unwrap_or("-"),
        endpoint = aws.endpoint_url.as_deref().unwrap_or("aws"),
        "AWS settings resolved"
    );

    let bucket = aws.bucket.clone();
    let http = AwsHttp::new(aws).context("building AWS HTTP client")?;

    let storage: Option<Arc<dyn StorageGateway>> = match (staging, bucket) {
        (StagingMode::S3, Some(bucket)) => Some(Arc::new(S3StorageGateway::new(
            http.clone(),
            bucket,
            config.liveness.key_prefix.clone(),
        ))),
        (StagingMode::S3, None) => anyhow::bail!("s3 staging requires a bucket"),
        (StagingMode::Inline, _) => {
            tracing::info!("inline staging: uploads are sent directly to session creation");
            None
        }
    };

    let liveness: Arc<dyn LivenessGateway> = Arc::new(RekognitionLivenessGateway::new(
        http,
        config.liveness.audit_images_limit,
    ));

    let settings = CoordinatorSettings::from(&config.liveness);
    tracing::info!(
        threshold = settings.confidence_threshold,
        deadline_ms = settings.poll.deadline.as_millis() as u64,
        "liveness coordinator ready"
    );

    Ok(SessionCoordinator::new(storage, liveness, settings))
}
