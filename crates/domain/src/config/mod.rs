mod aws;
mod liveness;
mod observability;
mod server;

pub use aws::*;
pub use liveness::*;
pub use observability::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good. Environment-provided
    /// credentials are checked separately by [`AwsConfig::resolve`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.server.max_upload_bytes == 0 {
            errors.push(ConfigError::error(
                "server.max_upload_bytes",
                "upload limit must be greater than 0",
            ));
        }
        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError::error(
                "server.max_concurrent_requests",
                "concurrency limit must be greater than 0",
            ));
        }

        let threshold = self.liveness.confidence_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            errors.push(ConfigError::error(
                "liveness.confidence_threshold",
                format!("threshold {threshold} is outside 0..=100"),
            ));
        }

        let poll = &self.liveness.poll;
        if poll.initial_backoff_ms == 0 {
            errors.push(ConfigError::error(
                "liveness.poll.initial_backoff_ms",
                "initial back-off must be greater than 0",
            ));
        }
        if poll.max_backoff_ms < poll.initial_backoff_ms {
            errors.push(ConfigError::error(
                "liveness.poll.max_backoff_ms",
                "max back-off must not be below the initial back-off",
            ));
        }
        if poll.deadline_ms == 0 {
            errors.push(ConfigError::error(
                "liveness.poll.deadline_ms",
                "deadline must be greater than 0",
            ));
        }

        if self.liveness.staging == StagingMode::Inline {
            errors.push(ConfigError::warning(
                "liveness.staging",
                "inline staging sends uploads straight to the analysis service; no staged copy is kept",
            ));
        }

        if self.aws.timeout_ms == 0 {
            errors.push(ConfigError::error(
                "aws.timeout_ms",
                "request timeout must be greater than 0",
            ));
        }

        let obs = &self.observability;
        if !(0.0..=1.0).contains(&obs.sample_rate) {
            errors.push(ConfigError::error(
                "observability.sample_rate",
                format!("sample rate {} is outside 0..=1", obs.sample_rate),
            ));
        }
        if let Some(ref endpoint) = obs.otlp_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                errors.push(ConfigError::error(
                    "observability.otlp_endpoint",
                    format!("{endpoint} must be an http:// or https:// URL"),
                ));
            }
        }
        if obs.service_name.trim().is_empty() {
            errors.push(ConfigError::error(
                "observability.service_name",
                "service name must not be empty",
            ));
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }
}
