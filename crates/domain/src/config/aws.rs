use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::StagingMode;
use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AWS access
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Names of the environment variables that carry AWS access, plus the
/// non-secret settings that may live in the config file.
///
/// Secrets never appear in `config.toml`; only the variable names do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "d_access_key_env")]
    pub access_key_env: String,
    #[serde(default = "d_secret_key_env")]
    pub secret_key_env: String,
    /// Optional STS session token (temporary credentials).
    #[serde(default = "d_session_token_env")]
    pub session_token_env: String,
    #[serde(default = "d_region_env")]
    pub region_env: String,
    /// Used when the region variable is unset.
    #[serde(default = "d_region")]
    pub region: String,
    #[serde(default = "d_bucket_env")]
    pub bucket_env: String,
    /// Override for S3 / Rekognition compatible endpoints (e.g. LocalStack).
    /// Both services are addressed under this base URL.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            access_key_env: d_access_key_env(),
            secret_key_env: d_secret_key_env(),
            session_token_env: d_session_token_env(),
            region_env: d_region_env(),
            region: d_region(),
            bucket_env: d_bucket_env(),
            endpoint_url: None,
            timeout_ms: d_timeout_ms(),
        }
    }
}

/// Static AWS credentials. `Debug` redacts the secret parts.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// AWS settings after environment resolution. Built once at startup and
/// shared by both remote gateways.
#[derive(Debug, Clone)]
pub struct ResolvedAws {
    pub credentials: Credentials,
    pub region: String,
    /// `None` only when staging is disabled.
    pub bucket: Option<String>,
    pub endpoint_url: Option<String>,
    pub timeout: Duration,
}

impl AwsConfig {
    /// Resolve credentials, region and bucket from the process environment.
    pub fn resolve(&self, staging: StagingMode) -> Result<ResolvedAws> {
        self.resolve_with(staging, |name| std::env::var(name).ok())
    }

    /// Resolve using an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Missing credentials are always fatal;
    /// a missing bucket is fatal only when uploads are staged to S3.
    pub fn resolve_with(
        &self,
        staging: StagingMode,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ResolvedAws> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let access_key_id = get(&self.access_key_env);
        if access_key_id.is_none() {
            missing.push(self.access_key_env.as_str());
        }
        let secret_access_key = get(&self.secret_key_env);
        if secret_access_key.is_none() {
            missing.push(self.secret_key_env.as_str());
        }
        let bucket = get(&self.bucket_env);
        if bucket.is_none() && staging == StagingMode::S3 {
            missing.push(self.bucket_env.as_str());
        }

        let (Some(access_key_id), Some(secret_access_key)) = (access_key_id, secret_access_key)
        else {
            return Err(missing_vars(&missing));
        };
        if !missing.is_empty() {
            return Err(missing_vars(&missing));
        }

        let region = get(&self.region_env).unwrap_or_else(|| self.region.clone());
        if region.trim().is_empty() {
            return Err(Error::Config(format!(
                "AWS region not set: export {} or set aws.region",
                self.region_env
            )));
        }

        Ok(ResolvedAws {
            credentials: Credentials {
                access_key_id,
                secret_access_key,
                session_token: get(&self.session_token_env),
            },
            region,
            bucket,
            endpoint_url: self
                .endpoint_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_owned()),
            timeout: Duration::from_millis(self.timeout_ms),
        })
    }
}

fn missing_vars(names: &[&str]) -> Error {
    Error::Config(format!(
        "required environment variable(s) not set: {}",
        names.join(", ")
    ))
}

// ── serde default helpers ───────────────────────────────────────────

fn d_access_key_env() -> String {
    "AWS_ACCESS_KEY".into()
}
fn d_secret_key_env() -> String {
    "AWS_SECRET_KEY".into()
}
fn d_session_token_env() -> String {
    "AWS_SESSION_TOKEN".into()
}
fn d_region_env() -> String {
    "AWS_REGION".into()
}
fn d_region() -> String {
    "us-east-1".into()
}
fn d_bucket_env() -> String {
    "LIVENESS_BUCKET".into()
}
fn d_timeout_ms() -> u64 {
    30_000
}
